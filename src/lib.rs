pub mod classifier;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod retention;
pub mod skip;
pub mod ui;
pub mod validator;

pub use engine::{RetentionEngine, SnapshotPolicy};
pub use error::{RetentionError, Result};
