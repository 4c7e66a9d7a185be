use thiserror::Error;

/// Unified error type for retention decisions
#[derive(Error, Debug)]
pub enum RetentionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Tag date error: {0}")]
    TagDate(String),

    #[error("Item id error: {0}")]
    ItemId(String),

    #[error("Commit date error: {0}")]
    CommitDate(String),

    #[error("Registry path error: {0}")]
    RegistryPath(String),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in registry-retention
pub type Result<T> = std::result::Result<T, RetentionError>;

impl RetentionError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        RetentionError::Config(msg.into())
    }

    /// Create a tag date error with context
    pub fn tag_date(msg: impl Into<String>) -> Self {
        RetentionError::TagDate(msg.into())
    }

    /// Create an item id error with context
    pub fn item_id(msg: impl Into<String>) -> Self {
        RetentionError::ItemId(msg.into())
    }

    /// Create a commit date error with context
    pub fn commit_date(msg: impl Into<String>) -> Self {
        RetentionError::CommitDate(msg.into())
    }

    /// Create a registry path error with context
    pub fn registry_path(msg: impl Into<String>) -> Self {
        RetentionError::RegistryPath(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RetentionError::config("pattern is empty");
        assert_eq!(err.to_string(), "Configuration error: pattern is empty");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RetentionError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_regex() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: RetentionError = regex_err.into();
        assert!(err.to_string().starts_with("Invalid pattern"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (RetentionError::config("x"), "Configuration error"),
            (RetentionError::tag_date("x"), "Tag date error"),
            (RetentionError::item_id("x"), "Item id error"),
            (RetentionError::commit_date("x"), "Commit date error"),
            (RetentionError::registry_path("x"), "Registry path error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_error_empty_messages() {
        let errors = vec![
            RetentionError::config(""),
            RetentionError::tag_date(""),
            RetentionError::item_id(""),
        ];

        for err in errors {
            // Even with empty message, the error type prefix should be present
            assert!(!err.to_string().is_empty());
        }
    }
}
