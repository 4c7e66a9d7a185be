use std::fmt;

/// Final verdict for a single registry tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Disposition {
    Unknown,
    ReleaseTag,
    ReleaseTagCanNotDelete,
    SystemTag,
    BranchStale,
    BranchNotStaled,
    BranchNotFound,
    SnapshotStaled,
    SnapshotTagCanNotDelete,
}

impl Disposition {
    /// Variant name as reported in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Unknown => "Unknown",
            Disposition::ReleaseTag => "ReleaseTag",
            Disposition::ReleaseTagCanNotDelete => "ReleaseTagCanNotDelete",
            Disposition::SystemTag => "SystemTag",
            Disposition::BranchStale => "BranchStale",
            Disposition::BranchNotStaled => "BranchNotStaled",
            Disposition::BranchNotFound => "BranchNotFound",
            Disposition::SnapshotStaled => "SnapshotStaled",
            Disposition::SnapshotTagCanNotDelete => "SnapshotTagCanNotDelete",
        }
    }

    /// Whether a tag with this disposition may be removed from the registry
    pub fn is_deletable(&self) -> bool {
        matches!(
            self,
            Disposition::ReleaseTag
                | Disposition::BranchNotFound
                | Disposition::BranchStale
                | Disposition::SnapshotStaled
        )
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
