//! Core sidekick operations

pub mod controller;
pub mod error;
pub mod fstab;
pub mod host;
pub mod matcher;
pub mod project;
pub mod store;

// Re-exports for library consumers
pub use controller::{DisplayController, Event, TabState};
pub use error::SidekickError;
pub use matcher::{matches, MatchOptions};
pub use project::{ConfigSet, ProjectConfig};
pub use store::{FileStore, MemoryStore, StateStore};
