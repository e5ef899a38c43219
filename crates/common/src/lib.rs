//! Shared identifier types used across the workspace.

mod types;

pub use types::StreamId;
