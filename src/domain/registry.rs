use crate::domain::Disposition;
use crate::error::{RetentionError, Result};

/// Minimum number of segments in a registry repository path (`group/project/image`)
const MIN_REGISTRY_PATH_SEGMENTS: usize = 3;

/// Convert a registry repository path to the owning project path.
///
/// `group/project/image` -> `group/project`
pub fn project_path(registry_path: &str) -> Result<String> {
    let segments: Vec<&str> = registry_path.split('/').collect();

    if segments.len() < MIN_REGISTRY_PATH_SEGMENTS {
        return Err(RetentionError::registry_path(format!(
            "path {} must contain group/project/image path",
            registry_path
        )));
    }

    Ok(segments[..segments.len() - 1].join("/"))
}

/// Tags listed for one registry repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTags {
    pub repository: String,
    pub tags: Vec<String>,
}

impl RepositoryTags {
    pub fn new<I, S>(repository: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RepositoryTags {
            repository: repository.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// A tag scheduled for deletion together with the reason
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeleteTag {
    pub repository: String,
    pub tag: String,
    pub disposition: Disposition,
}
