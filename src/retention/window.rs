use crate::domain::{ArchNormalizer, DatePattern, DatedTag};
use crate::error::{RetentionError, Result};
use crate::skip::SkipReason;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Returns the default retention window in days.
pub fn default_not_delete_days() -> f64 {
    10.0
}

/// Returns the default number of distinct dates that always survive.
pub fn default_min_keep_count() -> usize {
    3
}

/// Result of one date-window evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowOutcome {
    /// Tags that must not be deleted
    pub keep: BTreeSet<String>,
    /// Valid dated tags, newest first (ties by name, descending)
    pub candidates: Vec<DatedTag>,
    /// Tags left out of the evaluation
    pub skipped: Vec<SkipReason>,
    /// Whether the minimum-keep floor replaced the window result
    pub used_minimum: bool,
}

impl WindowOutcome {
    /// Valid dated tags not protected by the keep-set
    pub fn deletable(&self) -> Vec<&str> {
        self.candidates
            .iter()
            .filter(|c| !self.keep.contains(&c.name))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Number of distinct dates covered by the keep-set
    pub fn kept_dates(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| self.keep.contains(&c.name))
            .map(|c| c.date)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Protects the newest date-encoded tags from deletion.
///
/// A tag is kept while its date is less than `not_delete_days` behind the
/// newest valid date. When that leaves fewer than `min_keep_count` distinct
/// dates, the newest `min_keep_count` dates are kept instead, with every
/// arch variant of each admitted build.
#[derive(Debug, Clone)]
pub struct DateWindowRetention {
    pattern: DatePattern,
    not_delete_days: f64,
    min_keep_count: usize,
    arch: ArchNormalizer,
}

impl DateWindowRetention {
    /// Create a retention window
    ///
    /// # Returns
    /// * `Err` - If `not_delete_days` is negative or not a finite number
    pub fn new(
        pattern: DatePattern,
        not_delete_days: f64,
        min_keep_count: usize,
        arch: ArchNormalizer,
    ) -> Result<Self> {
        if !not_delete_days.is_finite() || not_delete_days < 0.0 {
            return Err(RetentionError::config(format!(
                "not delete days must be a non-negative number, got {}",
                not_delete_days
            )));
        }

        Ok(DateWindowRetention {
            pattern,
            not_delete_days,
            min_keep_count,
            arch,
        })
    }

    pub fn pattern(&self) -> &DatePattern {
        &self.pattern
    }

    /// Tags that must not be deleted, evaluated against the current time
    pub fn compute_keep_set<I, S>(&self, tags: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.compute_keep_set_at(tags, Utc::now())
    }

    /// Tags that must not be deleted, evaluated against `now`
    pub fn compute_keep_set_at<I, S>(&self, tags: I, now: DateTime<Utc>) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.evaluate(tags, now).keep
    }

    /// Full evaluation including candidates and skipped tags
    pub fn evaluate<I, S>(&self, tags: I, now: DateTime<Utc>) -> WindowOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = tags.into_iter().map(|t| t.as_ref().to_string()).collect();

        let mut candidates = Vec::new();
        let mut skipped = Vec::new();

        for tag in &unique {
            match self.pattern.inspect(tag, now) {
                Ok(dated) => candidates.push(dated),
                Err(reason @ SkipReason::PatternMismatch { .. }) => {
                    tracing::debug!(tag = reason.tag(), "not a dated tag");
                    skipped.push(reason);
                }
                Err(reason) => {
                    tracing::warn!(tag = reason.tag(), %reason, "skipping tag");
                    skipped.push(reason);
                }
            }
        }

        candidates.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.name.cmp(&a.name)));

        let Some(max_date) = candidates.first().map(|c| c.date) else {
            return WindowOutcome {
                skipped,
                ..WindowOutcome::default()
            };
        };

        let window: BTreeSet<String> = candidates
            .iter()
            .filter(|c| {
                let diff_days = c.days_before(max_date) as f64;
                tracing::debug!(tag = %c.name, diff_days, "date window");
                diff_days < self.not_delete_days
            })
            .map(|c| c.name.clone())
            .collect();

        let mut outcome = WindowOutcome {
            keep: window,
            candidates,
            skipped,
            used_minimum: false,
        };

        if outcome.kept_dates() < self.min_keep_count {
            tracing::debug!(
                kept_dates = outcome.kept_dates(),
                min_keep_count = self.min_keep_count,
                "window keeps too few dates, keeping newest builds instead"
            );
            outcome.keep = self.minimum_keep(&outcome.candidates);
            outcome.used_minimum = true;
        }

        outcome
    }

    /// Newest builds covering `min_keep_count` distinct dates.
    /// `candidates` must already be sorted newest first.
    fn minimum_keep(&self, candidates: &[DatedTag]) -> BTreeSet<String> {
        let mut dates = BTreeSet::new();
        let mut builds = BTreeSet::new();

        for candidate in candidates {
            let build = self.arch.normalize(&candidate.name);
            if builds.contains(build) {
                continue;
            }

            if !dates.contains(&candidate.date) {
                if dates.len() >= self.min_keep_count {
                    break;
                }
                dates.insert(candidate.date);
            }

            builds.insert(build);
        }

        candidates
            .iter()
            .filter(|c| builds.contains(self.arch.normalize(&c.name)))
            .map(|c| c.name.clone())
            .collect()
    }
}
