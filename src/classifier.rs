//! Per-tag disposition rules
//!
//! Main-tag classification is an ordered list of rules; every rule that
//! applies overrides the verdict of the rules before it:
//! 1. `Unknown`
//! 2. branch liveness (`BranchStale`, `BranchNotStaled`, `BranchNotFound`)
//! 3. release tags (`ReleaseTag`, `ReleaseTagCanNotDelete`)
//! 4. system tags (`SystemTag`)

use crate::domain::{ArchNormalizer, BranchMap, Disposition};
use crate::error::{RetentionError, Result};
use regex::Regex;
use std::collections::BTreeSet;

/// Returns the default release tag pattern.
pub fn default_release_tag_pattern() -> String {
    r"^release-(\d{8}).*$".to_string()
}

/// Returns the default system tag pattern.
pub fn default_system_tag_pattern() -> String {
    "^(main|master)$".to_string()
}

/// Everything a rule may look at for one tag
#[derive(Debug, Clone, Copy)]
pub struct TagFacts<'a> {
    pub tag: &'a str,
    pub canonical: &'a str,
    pub branches: &'a BranchMap,
    pub release_keep: &'a BTreeSet<String>,
}

/// A classification rule; `None` leaves the previous verdict in place
pub type Rule = fn(&TagClassifier, &TagFacts<'_>) -> Option<Disposition>;

/// Rules in priority order, lowest first
pub const RULES: &[Rule] = &[branch_rule, release_rule, system_rule];

fn branch_rule(_: &TagClassifier, facts: &TagFacts<'_>) -> Option<Disposition> {
    let disposition = match facts.branches.get(facts.canonical) {
        Some(branch) if branch.stale => Disposition::BranchStale,
        Some(branch) => {
            tracing::debug!(
                tag = facts.tag,
                branch = %branch.original_name,
                stale_days = branch.stale_days,
                "branch has recent commits"
            );
            Disposition::BranchNotStaled
        }
        None => Disposition::BranchNotFound,
    };

    Some(disposition)
}

fn release_rule(classifier: &TagClassifier, facts: &TagFacts<'_>) -> Option<Disposition> {
    if !classifier.release.is_match(facts.tag) {
        return None;
    }

    if facts.release_keep.contains(facts.tag) {
        Some(Disposition::ReleaseTagCanNotDelete)
    } else {
        Some(Disposition::ReleaseTag)
    }
}

fn system_rule(classifier: &TagClassifier, facts: &TagFacts<'_>) -> Option<Disposition> {
    classifier
        .system
        .is_match(facts.canonical)
        .then_some(Disposition::SystemTag)
}

/// Classifies main (branch and release) tags
#[derive(Debug, Clone)]
pub struct TagClassifier {
    release: Regex,
    system: Regex,
    arch: ArchNormalizer,
}

impl TagClassifier {
    /// Create a classifier from release and system tag patterns
    pub fn new(
        release_pattern: &str,
        system_pattern: &str,
        arch: ArchNormalizer,
    ) -> Result<Self> {
        Ok(TagClassifier {
            release: compile_required("release tag", release_pattern)?,
            system: compile_required("system tag", system_pattern)?,
            arch,
        })
    }

    pub fn arch(&self) -> &ArchNormalizer {
        &self.arch
    }

    /// Final disposition of a tag
    pub fn classify(
        &self,
        tag: &str,
        branches: &BranchMap,
        release_keep: &BTreeSet<String>,
    ) -> Disposition {
        let facts = TagFacts {
            tag,
            canonical: self.arch.normalize(tag),
            branches,
            release_keep,
        };

        RULES
            .iter()
            .filter_map(|rule| rule(self, &facts))
            .last()
            .unwrap_or(Disposition::Unknown)
    }
}

/// Snapshot flow: tags start `SnapshotStaled`; kept ones can't be deleted
pub fn classify_snapshot(tag: &str, snapshot_keep: &BTreeSet<String>) -> Disposition {
    if snapshot_keep.contains(tag) {
        Disposition::SnapshotTagCanNotDelete
    } else {
        Disposition::SnapshotStaled
    }
}

fn compile_required(name: &str, pattern: &str) -> Result<Regex> {
    if pattern.is_empty() {
        return Err(RetentionError::config(format!("{} pattern is empty", name)));
    }

    Ok(Regex::new(pattern)?)
}
