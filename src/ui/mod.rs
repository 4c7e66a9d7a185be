//! User interface module - input reading and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Reading tag, item and branch listings from files or stdin

use std::fs;
use std::io::{self, Read};

use chrono::{DateTime, Utc};

use crate::domain::{BranchInfo, BranchMap, RepositoryTags};
use crate::error::{RetentionError, Result};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_group, display_skip, display_status, display_success,
    display_window_outcome, format_delete_line, format_disposition_line, format_keep_line,
};

/// Read non-empty, trimmed lines from a file, or from stdin when `path` is `None` or `-`.
pub fn read_lines(path: Option<&str>) -> Result<Vec<String>> {
    let content = match path {
        Some(path) if path != "-" => fs::read_to_string(path)?,
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    Ok(parse_lines(&content))
}

/// Non-empty, trimmed lines; `#` starts a comment line
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Parse a branch listing.
///
/// Each line holds a branch name and the RFC 3339 timestamp of its last
/// commit, separated by whitespace:
///
/// ```text
/// feature/login 2022-03-30T10:00:00Z
/// ```
pub fn parse_branches(content: &str, now: DateTime<Utc>, stale_days: u32) -> Result<BranchMap> {
    let mut branches = BranchMap::new();

    for line in parse_lines(content) {
        let mut parts = line.split_whitespace();
        let (Some(name), Some(committed), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RetentionError::config(format!(
                "branch line '{}' must be '<name> <last-commit-rfc3339>'",
                line
            )));
        };

        let committed = DateTime::parse_from_rfc3339(committed).map_err(|e| {
            RetentionError::commit_date(format!(
                "can not parse last commit of branch '{}': {}",
                name, e
            ))
        })?;

        branches.insert(BranchInfo::from_last_commit(
            name,
            committed.with_timezone(&Utc),
            now,
            stale_days,
        ));
    }

    Ok(branches)
}

/// Parse a registry listing of `<repository> <tag>` lines.
///
/// Repositories keep the order of their first appearance.
pub fn parse_repository_tags(content: &str) -> Result<Vec<RepositoryTags>> {
    let mut repositories: Vec<RepositoryTags> = Vec::new();

    for line in parse_lines(content) {
        let mut parts = line.split_whitespace();
        let (Some(repository), Some(tag), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RetentionError::config(format!(
                "registry line '{}' must be '<repository> <tag>'",
                line
            )));
        };

        match repositories.iter_mut().find(|r| r.repository == repository) {
            Some(existing) => existing.tags.push(tag.to_string()),
            None => repositories.push(RepositoryTags::new(repository, [tag])),
        }
    }

    Ok(repositories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_lines() {
        let content = "\n release-20220320 \n# comment\n\nmain\n";
        assert_eq!(parse_lines(content), vec!["release-20220320", "main"]);
    }

    #[test]
    fn test_parse_branches() {
        let now = Utc.with_ymd_and_hms(2022, 4, 1, 0, 0, 0).unwrap();
        let content = "feature/Login 2022-03-30T10:00:00Z\nold-work 2022-01-01T00:00:00+02:00\n";

        let branches = parse_branches(content, now, 30).unwrap();

        assert_eq!(branches.len(), 2);
        assert!(!branches.get("feature-login").unwrap().stale);
        assert!(branches.get("old-work").unwrap().stale);
    }

    #[test]
    fn test_parse_branches_rejects_bad_lines() {
        let now = Utc.with_ymd_and_hms(2022, 4, 1, 0, 0, 0).unwrap();

        assert!(parse_branches("feature", now, 30).is_err());
        assert!(parse_branches("feature yesterday", now, 30).is_err());
        assert!(parse_branches("a 2022-03-30T10:00:00Z extra", now, 30).is_err());
    }

    #[test]
    fn test_parse_repository_tags() {
        let content = "db/dump/mysql-a 20220101-snap\ndb/dump/mysql-b 20220102-snap\ndb/dump/mysql-a latest\n";

        let repositories = parse_repository_tags(content).unwrap();

        assert_eq!(repositories.len(), 2);
        assert_eq!(repositories[0].repository, "db/dump/mysql-a");
        assert_eq!(repositories[0].tags, vec!["20220101-snap", "latest"]);
        assert_eq!(repositories[1].tags, vec!["20220102-snap"]);
        assert!(parse_repository_tags("db/dump/mysql-a").is_err());
    }
}
