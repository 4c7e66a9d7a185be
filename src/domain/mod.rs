//! Domain logic - pure value types independent of any registry or VCS client

pub mod arch;
pub mod branch;
pub mod disposition;
pub mod registry;
pub mod tag;

pub use arch::ArchNormalizer;
pub use branch::{slugify, BranchInfo, BranchMap};
pub use disposition::Disposition;
pub use registry::{project_path, DeleteTag, RepositoryTags};
pub use tag::{DatePattern, DatedTag};
