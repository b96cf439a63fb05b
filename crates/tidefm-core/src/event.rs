//! Change notifications produced by the directory watcher.
//!
//! Events flow **core → UI** over a plain channel; the UI decides how to
//! refresh its views.

use std::fmt;
use std::path::{Path, PathBuf};

/// What happened to a path between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Deleted,
    /// A file's size or modification time changed. Never used for
    /// directories.
    Updated,
    /// A deleted and a created file were paired up as one move. Only
    /// produced when move detection is enabled.
    Moved,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeKind::Created => "created",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Updated => "updated",
            ChangeKind::Moved => "moved",
        };
        f.pad(label)
    }
}

/// One change to one path under a watched root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub is_dir: bool,
    pub kind: ChangeKind,
    /// Destination of a [`ChangeKind::Moved`] event; `None` otherwise.
    pub new_path: Option<PathBuf>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self {
            path: path.into(),
            is_dir,
            kind,
            new_path: None,
        }
    }

    pub fn moved(from: impl Into<PathBuf>, to: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self {
            path: from.into(),
            is_dir,
            kind: ChangeKind::Moved,
            new_path: Some(to.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_dir { "/" } else { "" };
        write!(f, "{:<8} {}{marker}", self.kind, self.path.display())?;
        if let Some(to) = &self.new_path {
            write!(f, " -> {}{marker}", to.display())?;
        }
        Ok(())
    }
}
