//! Retention engine
//!
//! Holds the compiled, immutable configuration and turns registry listings
//! into deletion plans. Listing the registry, reading branches from the VCS
//! and deleting the planned tags are left to the caller.

use crate::classifier::{classify_snapshot, TagClassifier};
use crate::domain::{project_path, BranchMap, DeleteTag, Disposition, RepositoryTags};
use crate::error::Result;
use crate::retention::DateWindowRetention;
use crate::validator::ReleaseTagValidator;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Snapshot retention: which repositories hold snapshots and how long they live
#[derive(Debug, Clone)]
pub struct SnapshotPolicy {
    /// Snapshot planning yields nothing unless enabled
    pub enabled: bool,
    pub window: DateWindowRetention,
    pub repositories: Regex,
}

/// Compiled retention configuration, built by [`crate::config::Config::compile`]
#[derive(Debug, Clone)]
pub struct RetentionEngine {
    release: DateWindowRetention,
    snapshot: SnapshotPolicy,
    classifier: TagClassifier,
    validator: ReleaseTagValidator,
    ignore_projects: Regex,
    stale_branch_days: u32,
}

impl RetentionEngine {
    pub fn new(
        release: DateWindowRetention,
        snapshot: SnapshotPolicy,
        classifier: TagClassifier,
        validator: ReleaseTagValidator,
        ignore_projects: Regex,
        stale_branch_days: u32,
    ) -> Self {
        RetentionEngine {
            release,
            snapshot,
            classifier,
            validator,
            ignore_projects,
            stale_branch_days,
        }
    }

    pub fn release_window(&self) -> &DateWindowRetention {
        &self.release
    }

    pub fn snapshot_window(&self) -> &DateWindowRetention {
        &self.snapshot.window
    }

    pub fn snapshots_enabled(&self) -> bool {
        self.snapshot.enabled
    }

    pub fn classifier(&self) -> &TagClassifier {
        &self.classifier
    }

    pub fn validator(&self) -> &ReleaseTagValidator {
        &self.validator
    }

    /// Days without commits after which a branch counts as stale
    pub fn stale_branch_days(&self) -> u32 {
        self.stale_branch_days
    }

    /// CI gate for a release tag
    pub fn check_release_tag(&self, tag: &str, commit_timestamp: &str) -> Result<()> {
        self.validator.check_release_tag(tag, commit_timestamp)
    }

    /// Disposition of every tag of one project
    pub fn classify_project_at<S: AsRef<str>>(
        &self,
        tags: &[S],
        branches: &BranchMap,
        now: DateTime<Utc>,
    ) -> BTreeMap<String, Disposition> {
        let release_keep = self
            .release
            .compute_keep_set_at(tags.iter().map(|t| t.as_ref()), now);

        tags.iter()
            .map(|tag| {
                let tag = tag.as_ref();
                let disposition = self.classifier.classify(tag, branches, &release_keep);
                (tag.to_string(), disposition)
            })
            .collect()
    }

    /// Group registry repositories by the project that owns them.
    ///
    /// Paths that can't be mapped to a project are skipped with a warning,
    /// projects matching the ignore pattern are left out.
    pub fn project_repositories<S: AsRef<str>>(
        &self,
        repositories: &[S],
    ) -> BTreeMap<String, Vec<String>> {
        let mut projects: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for repository in repositories {
            let repository = repository.as_ref();

            let project = match project_path(repository) {
                Ok(project) => project,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping repository");
                    continue;
                }
            };

            if self.ignore_projects.is_match(&project) {
                tracing::debug!(project = %project, "ignoring project");
                continue;
            }

            projects
                .entry(project)
                .or_default()
                .push(repository.to_string());
        }

        projects
    }

    /// Deletion plan for the repositories of one project
    pub fn plan_project(
        &self,
        repositories: &[RepositoryTags],
        branches: &BranchMap,
    ) -> Vec<DeleteTag> {
        self.plan_project_at(repositories, branches, Utc::now())
    }

    /// Deletion plan for the repositories of one project, evaluated at `now`.
    ///
    /// Tags are classified against the union of all repositories' tags, so a
    /// release kept in one image repository is kept in all of them.
    pub fn plan_project_at(
        &self,
        repositories: &[RepositoryTags],
        branches: &BranchMap,
        now: DateTime<Utc>,
    ) -> Vec<DeleteTag> {
        let all_tags: Vec<&str> = repositories
            .iter()
            .flat_map(|r| r.tags.iter().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let dispositions = self.classify_project_at(&all_tags, branches, now);

        let mut plan = Vec::new();
        for repository in repositories {
            for tag in &repository.tags {
                let disposition = dispositions
                    .get(tag)
                    .copied()
                    .unwrap_or(Disposition::Unknown);

                match disposition {
                    d if d.is_deletable() => plan.push(DeleteTag {
                        repository: repository.repository.clone(),
                        tag: tag.clone(),
                        disposition: d,
                    }),
                    Disposition::Unknown => tracing::warn!(
                        repository = %repository.repository,
                        tag = %tag,
                        "unknown tag"
                    ),
                    d => tracing::info!(
                        repository = %repository.repository,
                        tag = %tag,
                        disposition = %d,
                        "keeping"
                    ),
                }
            }
        }

        plan
    }

    /// Snapshot deletion plan for every repository matching the snapshot pattern.
    ///
    /// Snapshot tags that match the pattern but can't be dated (unparsable or
    /// future dates) are never kept, so they end up in the plan.
    pub fn plan_snapshots(&self, repositories: &[RepositoryTags]) -> Vec<DeleteTag> {
        self.plan_snapshots_at(repositories, Utc::now())
    }

    pub fn plan_snapshots_at(
        &self,
        repositories: &[RepositoryTags],
        now: DateTime<Utc>,
    ) -> Vec<DeleteTag> {
        let mut plan = Vec::new();

        if !self.snapshot.enabled {
            tracing::debug!("snapshot retention disabled");
            return plan;
        }

        for repository in repositories {
            if !self.snapshot.repositories.is_match(&repository.repository) {
                continue;
            }

            let keep = self
                .snapshot
                .window
                .compute_keep_set_at(repository.tags.iter().map(String::as_str), now);

            for tag in &repository.tags {
                if !self.snapshot.window.pattern().is_match(tag) {
                    continue;
                }

                let disposition = classify_snapshot(tag, &keep);
                if disposition.is_deletable() {
                    plan.push(DeleteTag {
                        repository: repository.repository.clone(),
                        tag: tag.clone(),
                        disposition,
                    });
                }
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::BranchInfo;
    use chrono::TimeZone;

    fn engine() -> RetentionEngine {
        Config::default().compile().unwrap()
    }

    fn snapshot_engine() -> RetentionEngine {
        let mut config = Config::default();
        config.snapshot.enabled = true;
        config.compile().unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 4, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_project_repositories() {
        let repositories = vec![
            "group/app/api",
            "group/app/web",
            "group/other/worker",
            "devops/docker/base",
            "broken",
        ];

        let projects = engine().project_repositories(&repositories);

        assert_eq!(projects.len(), 2);
        assert_eq!(projects["group/app"], vec!["group/app/api", "group/app/web"]);
        assert_eq!(projects["group/other"], vec!["group/other/worker"]);
    }

    #[test]
    fn test_plan_project() {
        let branches: BranchMap = vec![
            BranchInfo::new("feature/live", false, 30),
            BranchInfo::new("feature/dead", true, 30),
        ]
        .into_iter()
        .collect();

        let repositories = vec![
            RepositoryTags::new(
                "group/app/api",
                [
                    "main",
                    "feature-live",
                    "feature-dead",
                    "release-20220320",
                    "release-20220101",
                ],
            ),
            RepositoryTags::new(
                "group/app/web",
                [
                    "release-20220310-amd64",
                    "release-20211201",
                    "release-20211101",
                    "gone",
                ],
            ),
        ];

        let plan = engine().plan_project_at(&repositories, &branches, now());
        let planned: Vec<(&str, &str, Disposition)> = plan
            .iter()
            .map(|d| (d.repository.as_str(), d.tag.as_str(), d.disposition))
            .collect();

        assert_eq!(
            planned,
            vec![
                ("group/app/api", "feature-dead", Disposition::BranchStale),
                ("group/app/web", "release-20211201", Disposition::ReleaseTag),
                ("group/app/web", "release-20211101", Disposition::ReleaseTag),
                ("group/app/web", "gone", Disposition::BranchNotFound),
            ]
        );
    }

    #[test]
    fn test_plan_snapshots() {
        let repositories = vec![
            RepositoryTags::new(
                "devops/docker/mysql-main",
                [
                    "20220101-snap",
                    "20220201-snap",
                    "20220301-snap",
                    "20220310-snap",
                    "latest",
                ],
            ),
            RepositoryTags::new("group/app/api", ["20210101-snap"]),
        ];

        let plan = snapshot_engine().plan_snapshots_at(&repositories, now());

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].tag, "20220101-snap");
        assert_eq!(plan[0].disposition, Disposition::SnapshotStaled);
    }

    #[test]
    fn test_plan_snapshots_disabled() {
        let repositories = vec![RepositoryTags::new(
            "devops/docker/mysql-main",
            ["20220101-snap", "20220201-snap", "20220301-snap", "20220310-snap"],
        )];

        let engine = engine();
        assert!(!engine.snapshots_enabled());
        assert!(engine.plan_snapshots_at(&repositories, now()).is_empty());
        assert!(engine.plan_snapshots(&repositories).is_empty());
    }

    #[test]
    fn test_plan_snapshots_deletes_undatable_tags() {
        let repositories = vec![RepositoryTags::new(
            "devops/docker/mysql-main",
            ["99990101-snap", "20221399-snap", "20220310-snap"],
        )];
        let engine = snapshot_engine();

        // the window itself has nothing to delete
        let outcome = engine
            .snapshot_window()
            .evaluate(&repositories[0].tags, now());
        assert!(outcome.deletable().is_empty());
        assert_eq!(outcome.skipped.len(), 2);

        let plan = engine.plan_snapshots_at(&repositories, now());
        let planned: Vec<(&str, Disposition)> = plan
            .iter()
            .map(|d| (d.tag.as_str(), d.disposition))
            .collect();
        assert_eq!(
            planned,
            vec![
                ("99990101-snap", Disposition::SnapshotStaled),
                ("20221399-snap", Disposition::SnapshotStaled),
            ]
        );
    }

    #[test]
    fn test_plan_snapshots_all_future() {
        let repositories = vec![RepositoryTags::new(
            "devops/docker/mysql-main",
            ["20300101-snap", "20300102-snap"],
        )];
        let engine = snapshot_engine();

        let outcome = engine
            .snapshot_window()
            .evaluate(&repositories[0].tags, now());
        assert!(outcome.keep.is_empty());
        assert!(outcome.deletable().is_empty());

        // future snapshots can't be kept by date, so planning removes them
        assert_eq!(engine.plan_snapshots_at(&repositories, now()).len(), 2);
    }

    #[test]
    fn test_classify_project() {
        let tags = vec!["master", "release-20220320", "release-20220320-arm64"];
        let dispositions = engine().classify_project_at(&tags, &BranchMap::new(), now());

        assert_eq!(dispositions["master"], Disposition::SystemTag);
        assert_eq!(
            dispositions["release-20220320-arm64"],
            Disposition::ReleaseTagCanNotDelete
        );
    }
}
