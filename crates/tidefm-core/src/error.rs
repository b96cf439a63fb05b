//! Error types for `tidefm-core`.
//!
//! Collaborators (raw I/O, trash, repository client) return [`CoreResult<T>`],
//! an alias for `Result<T, CoreError>`. User-facing operations convert these
//! into [`crate::Outcome`] values at their boundary.

use std::path::PathBuf;

/// Unified error type for all core collaborators.
///
/// Each variant captures just enough context for the caller to display
/// a meaningful message or take corrective action.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// Something already occupies the target path.
    #[error("already exists: {0}")]
    AlreadyExists(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A file or directory name is invalid (empty, contains path separators, etc.).
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// The operation needs a parent directory and the path has none.
    #[error("top-level directory: {0}")]
    TopLevelDirectory(PathBuf),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A long-running task was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// A git operation failed.
    #[error("git error: {0}")]
    Git(String),

    /// Moving to or restoring from the trash failed.
    #[error("trash error: {0}")]
    Trash(String),

    /// The commit message was rejected before reaching the repository.
    #[error("invalid commit message: {0}")]
    InvalidCommitMessage(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<git2::Error> for CoreError {
    fn from(err: git2::Error) -> Self {
        CoreError::Git(err.message().to_string())
    }
}

impl From<trash::Error> for CoreError {
    fn from(err: trash::Error) -> Self {
        CoreError::Trash(err.to_string())
    }
}

/// Convenience alias used throughout `tidefm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
