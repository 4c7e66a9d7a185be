use crate::classifier::{default_release_tag_pattern, default_system_tag_pattern, TagClassifier};
use crate::domain::arch::default_arch_suffixes;
use crate::domain::branch::default_stale_branch_days;
use crate::domain::{ArchNormalizer, DatePattern};
use crate::engine::{RetentionEngine, SnapshotPolicy};
use crate::error::{RetentionError, Result};
use crate::retention::window::{default_min_keep_count, default_not_delete_days};
use crate::retention::{DateWindowRetention, GroupIdRetention, GroupPattern};
use crate::validator::{default_release_tag_allowed_delta_days, ReleaseTagValidator};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "registry-retention.toml";

/// File name looked up in the user config directory
pub const USER_CONFIG_FILE: &str = ".registry-retention.toml";

/// Represents the complete configuration for registry-retention.
///
/// Every section has defaults, so an empty file is a valid configuration.
/// Use [`Config::compile`] to validate the patterns and obtain an engine.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub system: SystemConfig,

    #[serde(default)]
    pub arch: ArchConfig,

    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default)]
    pub ci: CiConfig,

    #[serde(default)]
    pub repositories: RepositoriesConfig,

    #[serde(default)]
    pub bucket: BucketConfig,
}

fn default_snapshot_tag_pattern() -> String {
    r"^(\d{8})-snap$".to_string()
}

fn default_snapshot_repository_pattern() -> String {
    "^devops/docker/mysql-.+$".to_string()
}

fn default_ignore_repository_pattern() -> String {
    "^devops/docker$".to_string()
}

/// Date-window retention of release tags
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    #[serde(default = "default_release_tag_pattern")]
    pub tag_pattern: String,

    #[serde(default = "default_not_delete_days")]
    pub not_delete_days: f64,

    #[serde(default = "default_min_keep_count")]
    pub min_keep_count: usize,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            tag_pattern: default_release_tag_pattern(),
            not_delete_days: default_not_delete_days(),
            min_keep_count: default_min_keep_count(),
        }
    }
}

/// Date-window retention of snapshot tags (e.g. database dumps)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_snapshot_repository_pattern")]
    pub repository_pattern: String,

    #[serde(default = "default_snapshot_tag_pattern")]
    pub tag_pattern: String,

    #[serde(default = "default_not_delete_days")]
    pub not_delete_days: f64,

    #[serde(default = "default_min_keep_count")]
    pub min_keep_count: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        SnapshotConfig {
            enabled: false,
            repository_pattern: default_snapshot_repository_pattern(),
            tag_pattern: default_snapshot_tag_pattern(),
            not_delete_days: default_not_delete_days(),
            min_keep_count: default_min_keep_count(),
        }
    }
}

/// Protected tag names
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SystemConfig {
    #[serde(default = "default_system_tag_pattern")]
    pub tag_pattern: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            tag_pattern: default_system_tag_pattern(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ArchConfig {
    #[serde(default = "default_arch_suffixes")]
    pub suffixes: Vec<String>,
}

impl Default for ArchConfig {
    fn default() -> Self {
        ArchConfig {
            suffixes: default_arch_suffixes(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    #[serde(default = "default_stale_branch_days")]
    pub stale_days: u32,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            stale_days: default_stale_branch_days(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CiConfig {
    #[serde(default = "default_release_tag_allowed_delta_days")]
    pub release_delta_days: u32,
}

impl Default for CiConfig {
    fn default() -> Self {
        CiConfig {
            release_delta_days: default_release_tag_allowed_delta_days(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RepositoriesConfig {
    /// Projects whose path matches are never cleaned
    #[serde(default = "default_ignore_repository_pattern")]
    pub ignore_pattern: String,
}

impl Default for RepositoriesConfig {
    fn default() -> Self {
        RepositoriesConfig {
            ignore_pattern: default_ignore_repository_pattern(),
        }
    }
}

/// Object-store folder pruning. Both values are caller-specified.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct BucketConfig {
    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub keep_count: Option<usize>,
}

impl Config {
    /// Validate every pattern and build the immutable retention engine
    pub fn compile(&self) -> Result<RetentionEngine> {
        let arch = ArchNormalizer::new(self.arch.suffixes.iter().cloned());
        let release_pattern = DatePattern::new(&self.release.tag_pattern)?;

        let release = DateWindowRetention::new(
            release_pattern.clone(),
            self.release.not_delete_days,
            self.release.min_keep_count,
            arch.clone(),
        )?;

        let snapshot = SnapshotPolicy {
            enabled: self.snapshot.enabled,
            window: DateWindowRetention::new(
                DatePattern::new(&self.snapshot.tag_pattern)?,
                self.snapshot.not_delete_days,
                self.snapshot.min_keep_count,
                arch.clone(),
            )?,
            repositories: Regex::new(&self.snapshot.repository_pattern)?,
        };

        let classifier =
            TagClassifier::new(&self.release.tag_pattern, &self.system.tag_pattern, arch)?;
        let validator = ReleaseTagValidator::new(release_pattern, self.ci.release_delta_days);

        Ok(RetentionEngine::new(
            release,
            snapshot,
            classifier,
            validator,
            Regex::new(&self.repositories.ignore_pattern)?,
            self.branches.stale_days,
        ))
    }

    /// Build the bucket pruning policy, overriding the configured values when given
    pub fn bucket_retention(
        &self,
        pattern: Option<&str>,
        keep_count: Option<usize>,
    ) -> Result<GroupIdRetention> {
        let pattern = pattern
            .or(self.bucket.pattern.as_deref())
            .ok_or_else(|| RetentionError::config("bucket pattern is not set"))?;
        let keep_count = keep_count
            .or(self.bucket.keep_count)
            .ok_or_else(|| RetentionError::config("bucket keep count is not set"))?;

        Ok(GroupIdRetention::new(GroupPattern::new(pattern)?, keep_count))
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `registry-retention.toml` in current directory
/// 3. `.registry-retention.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        fs::read_to_string(LOCAL_CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
