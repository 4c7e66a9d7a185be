//! Retention policies that decide which items survive a cleanup run

pub mod group;
pub mod window;

pub use group::{GroupIdRetention, GroupPattern, GroupedItem};
pub use window::{DateWindowRetention, WindowOutcome};
