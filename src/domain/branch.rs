use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Max slug length accepted by the VCS for ref slugs
const MAX_SLUG_LEN: usize = 63;

/// Characters that can't appear in a slug
static NON_SLUG_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9]").unwrap_or_else(|_| unreachable!()));

/// Hours in one day
const HOURS_IN_DAY: i64 = 24;

/// Returns the default number of days after which a branch is stale.
pub fn default_stale_branch_days() -> u32 {
    30
}

/// Convert a branch name to the slug used for image tags.
///
/// * Lowercased
/// * Anything not matching `[a-z0-9]` is replaced with `-`
/// * First/last character is not a dash
/// * At most 63 bytes
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let replaced = NON_SLUG_CHAR.replace_all(&lowered, "-");
    let replaced: &str = &replaced;

    let trimmed = replaced.strip_prefix('-').unwrap_or(replaced);
    let trimmed = trimmed.strip_suffix('-').unwrap_or(trimmed);

    // only ASCII remains, so any byte offset is a char boundary
    trimmed[..trimmed.len().min(MAX_SLUG_LEN)].to_string()
}

/// Liveness information for a source-control branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub slug: String,
    pub stale: bool,
    pub stale_days: u32,
    pub original_name: String,
}

impl BranchInfo {
    /// Create branch info from already computed staleness
    pub fn new(original_name: impl Into<String>, stale: bool, stale_days: u32) -> Self {
        let original_name = original_name.into();

        BranchInfo {
            slug: slugify(&original_name),
            stale,
            stale_days,
            original_name,
        }
    }

    /// Branch is stale when its last commit is more than `stale_days` old
    pub fn from_last_commit(
        name: impl Into<String>,
        last_commit: DateTime<Utc>,
        now: DateTime<Utc>,
        stale_days: u32,
    ) -> Self {
        let hours_ago = (now - last_commit).num_hours();
        let stale = hours_ago > HOURS_IN_DAY * i64::from(stale_days);

        BranchInfo::new(name, stale, stale_days)
    }
}

/// Branches of one project keyed by slug
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchMap {
    branches: BTreeMap<String, BranchInfo>,
}

impl BranchMap {
    /// Create an empty branch map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch; a later branch with the same slug replaces the earlier one
    pub fn insert(&mut self, info: BranchInfo) {
        self.branches.insert(info.slug.clone(), info);
    }

    /// Look up a branch by the canonical tag name
    pub fn get(&self, slug: &str) -> Option<&BranchInfo> {
        self.branches.get(slug)
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BranchInfo> {
        self.branches.values()
    }
}

impl FromIterator<BranchInfo> for BranchMap {
    fn from_iter<T: IntoIterator<Item = BranchInfo>>(iter: T) -> Self {
        let mut map = BranchMap::new();
        for info in iter {
            map.insert(info);
        }
        map
    }
}
