//! Error taxonomy for sidekick operations

use thiserror::Error;

use super::host::TabId;

/// Errors raised by the sidekick core
///
/// None of these are fatal: the display controller logs them and keeps
/// handling subsequent events.
#[derive(Debug, Error)]
pub enum SidekickError {
    #[error("invalid GitHub URL: {0}")]
    InvalidGitUrl(String),

    #[error("invalid share URL: {0}")]
    InvalidShareUrl(String),

    #[error("project already exists: {owner}/{repo} ({git_ref})")]
    DuplicateProject {
        owner: String,
        repo: String,
        git_ref: String,
    },

    #[error("unknown project: {0}")]
    UnknownProject(String),

    #[error("tab {0} is no longer available")]
    TabUnavailable(TabId),

    #[error("host error: {0}")]
    Host(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, SidekickError>;
