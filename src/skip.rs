use chrono::NaiveDate;
use std::fmt;

/// Reasons a tag is left out of date-window retention.
/// These are non-fatal and only reported to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Tag doesn't match the configured date pattern
    PatternMismatch { tag: String, pattern: String },
    /// Captured value is not a valid `YYYYMMDD` date
    UnparsableDate { tag: String, reason: String },
    /// Embedded date lies after the evaluation time
    FutureDate { tag: String, date: NaiveDate },
}

impl SkipReason {
    /// Name of the tag that was skipped
    pub fn tag(&self) -> &str {
        match self {
            SkipReason::PatternMismatch { tag, .. }
            | SkipReason::UnparsableDate { tag, .. }
            | SkipReason::FutureDate { tag, .. } => tag,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PatternMismatch { tag, pattern } => {
                write!(f, "tag '{}' doesn't match pattern '{}'", tag, pattern)
            }
            SkipReason::UnparsableDate { tag, reason } => {
                write!(f, "can not parse date of tag '{}': {}", tag, reason)
            }
            SkipReason::FutureDate { tag, date } => {
                write!(
                    f,
                    "tag '{}' date {} can not be in future",
                    tag,
                    date.format("%Y-%m-%d")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_mismatch_display() {
        let reason = SkipReason::PatternMismatch {
            tag: "test-branch".to_string(),
            pattern: r"^release-(\d{8}).*$".to_string(),
        };

        let msg = reason.to_string();
        assert!(msg.contains("doesn't match pattern"), "got: {}", msg);
        assert!(msg.contains("test-branch"), "got: {}", msg);
        assert_eq!(reason.tag(), "test-branch");
    }

    #[test]
    fn test_unparsable_date_display() {
        let reason = SkipReason::UnparsableDate {
            tag: "release-20220199".to_string(),
            reason: "invalid day".to_string(),
        };

        let msg = reason.to_string();
        assert!(msg.contains("can not parse date"), "got: {}", msg);
        assert!(msg.contains("invalid day"), "got: {}", msg);
    }

    #[test]
    fn test_future_date_display() {
        let reason = SkipReason::FutureDate {
            tag: "release-99990101".to_string(),
            date: NaiveDate::from_ymd_opt(9999, 1, 1).unwrap(),
        };

        let msg = reason.to_string();
        assert!(msg.contains("future"), "got: {}", msg);
        assert!(msg.contains("9999-01-01"), "got: {}", msg);
    }
}
