use crate::error::{RetentionError, Result};
use crate::skip::SkipReason;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use std::fmt;

/// Length of the compact `YYYYMMDD` date embedded in tag names
const COMPACT_DATE_LEN: usize = 8;
const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

/// A tag whose name carries a valid, non-future build date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedTag {
    pub name: String,
    pub date: NaiveDate,
}

impl DatedTag {
    /// Create a dated tag
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        DatedTag {
            name: name.into(),
            date,
        }
    }

    /// Midnight UTC of the embedded date
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.date.and_time(NaiveTime::MIN).and_utc()
    }

    /// Whole days between this tag's date and a later one
    pub fn days_before(&self, later: NaiveDate) -> i64 {
        (later - self.date).num_days()
    }
}

impl fmt::Display for DatedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.date.format("%Y-%m-%d"))
    }
}

/// Compiled pattern whose single capture group yields an 8-digit date.
///
/// Used for release tags (`^release-(\d{8}).*$`) and snapshot tags
/// (`^(\d{8})-snap$`).
#[derive(Debug, Clone)]
pub struct DatePattern {
    regex: Regex,
}

impl DatePattern {
    /// Compile and validate a date pattern
    ///
    /// # Returns
    /// * `Ok(DatePattern)` - Pattern with exactly one capture group
    /// * `Err` - If the pattern is empty, invalid, or has a different number of groups
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(RetentionError::config("date pattern is empty"));
        }

        let regex = Regex::new(pattern)?;

        // captures_len counts the implicit whole-match group
        if regex.captures_len() != 2 {
            return Err(RetentionError::config(format!(
                "date pattern '{}' must contain exactly one capture group",
                pattern
            )));
        }

        Ok(DatePattern { regex })
    }

    /// Pattern source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Check whether a tag matches the pattern at all
    pub fn is_match(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }

    /// Inspect a tag: its dated form, or the reason it can't take part in retention
    pub fn inspect(
        &self,
        tag: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<DatedTag, SkipReason> {
        let captures = self
            .regex
            .captures(tag)
            .ok_or_else(|| SkipReason::PatternMismatch {
                tag: tag.to_string(),
                pattern: self.regex.as_str().to_string(),
            })?;

        let raw = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let date = parse_compact_date(raw).map_err(|reason| SkipReason::UnparsableDate {
            tag: tag.to_string(),
            reason,
        })?;

        let dated = DatedTag::new(tag, date);
        if dated.timestamp() > now {
            return Err(SkipReason::FutureDate {
                tag: tag.to_string(),
                date,
            });
        }

        Ok(dated)
    }

    /// Extract the embedded date from a tag name.
    ///
    /// Fails when the tag does not match, when the captured value is not a
    /// valid `YYYYMMDD` date, or when that date lies after `now`.
    pub fn parse_tag(&self, tag: &str, now: DateTime<Utc>) -> Result<DatedTag> {
        self.inspect(tag, now)
            .map_err(|reason| RetentionError::tag_date(reason.to_string()))
    }
}

/// Parse a compact `YYYYMMDD` value
pub fn parse_compact_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    if raw.len() != COMPACT_DATE_LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not an 8-digit date", raw));
    }

    NaiveDate::parse_from_str(raw, COMPACT_DATE_FORMAT)
        .map_err(|e| format!("can not parse date '{}': {}", raw, e))
}
