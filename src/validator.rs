use crate::domain::DatePattern;
use crate::error::{RetentionError, Result};
use chrono::{DateTime, Utc};

/// Seconds in one day
const SECONDS_IN_DAY: f64 = 86_400.0;

/// Returns the default allowed gap between release tag date and commit date.
pub fn default_release_tag_allowed_delta_days() -> u32 {
    5
}

/// CI gate: a release tag's date must be close to the tagged commit's date
#[derive(Debug, Clone)]
pub struct ReleaseTagValidator {
    pattern: DatePattern,
    allowed_delta_days: u32,
}

impl ReleaseTagValidator {
    pub fn new(pattern: DatePattern, allowed_delta_days: u32) -> Self {
        ReleaseTagValidator {
            pattern,
            allowed_delta_days,
        }
    }

    pub fn allowed_delta_days(&self) -> u32 {
        self.allowed_delta_days
    }

    /// Check a release tag against an RFC 3339 commit timestamp
    pub fn check_release_tag(&self, tag: &str, commit_timestamp: &str) -> Result<()> {
        self.check_release_tag_at(tag, commit_timestamp, Utc::now())
    }

    /// Check a release tag, treating `now` as the current time
    ///
    /// # Returns
    /// * `Ok(())` - The tag date is at most `allowed_delta_days` away from the commit
    /// * `Err` - If the tag is invalid, the timestamp is malformed, or the gap is too big
    pub fn check_release_tag_at(
        &self,
        tag: &str,
        commit_timestamp: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let release = self.pattern.parse_tag(tag, now)?;

        let commit = DateTime::parse_from_rfc3339(commit_timestamp).map_err(|e| {
            RetentionError::commit_date(format!(
                "can not parse commit date '{}': {}",
                commit_timestamp, e
            ))
        })?;

        let diff = commit.with_timezone(&Utc) - release.timestamp();
        let diff_days = (diff.num_seconds() as f64 / SECONDS_IN_DAY).abs();

        tracing::debug!(tag, commit_timestamp, diff_days, "release tag date check");

        if diff_days > f64::from(self.allowed_delta_days) {
            return Err(RetentionError::tag_date(format!(
                "difference between commit date and release bigger than {} days",
                self.allowed_delta_days
            )));
        }

        Ok(())
    }
}
