//! Per-path version-control status and its propagation to folders.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Status of a path as shown next to it in the UI.
///
/// `Unstaged` dominates `Staged`: a folder holding both kinds of change is
/// `Unstaged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VcsStatus {
    /// Clean, ignored, or outside any repository.
    #[default]
    NotVersionControlled,
    /// Changes recorded in the index only.
    Staged,
    /// Changes in the working tree (including untracked files).
    Unstaged,
}

impl fmt::Display for VcsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VcsStatus::NotVersionControlled => "clean",
            VcsStatus::Staged => "staged",
            VcsStatus::Unstaged => "unstaged",
        };
        f.pad(label)
    }
}

/// One changed path as reported by the repository client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Path relative to the repository root.
    pub path: PathBuf,
    /// The index differs from HEAD.
    pub index_changed: bool,
    /// The working tree differs from the index.
    pub worktree_changed: bool,
}

impl StatusEntry {
    pub fn new(path: impl Into<PathBuf>, index_changed: bool, worktree_changed: bool) -> Self {
        Self {
            path: path.into(),
            index_changed,
            worktree_changed,
        }
    }

    /// Maps the change flags to a [`VcsStatus`]. Working-tree changes win.
    pub fn classify(&self) -> VcsStatus {
        if self.worktree_changed {
            VcsStatus::Unstaged
        } else if self.index_changed {
            VcsStatus::Staged
        } else {
            VcsStatus::NotVersionControlled
        }
    }
}

/// Absolute path to status, with folder statuses derived from their
/// contents.
///
/// Paths missing from the map are [`VcsStatus::NotVersionControlled`].
#[derive(Debug, Clone, Default)]
pub struct StatusMap {
    statuses: HashMap<PathBuf, VcsStatus>,
}

impl StatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map for a repository rooted at `root` from the client's
    /// changed entries.
    pub fn from_entries(root: &Path, entries: &[StatusEntry]) -> Self {
        let mut map = Self::new();
        for entry in entries {
            map.record_and_propagate(root, &root.join(&entry.path), entry.classify());
        }
        map
    }

    pub fn get(&self, path: &Path) -> VcsStatus {
        self.statuses.get(path).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn clear(&mut self) {
        self.statuses.clear();
    }

    /// Every recorded path with a status other than clean, sorted by path.
    pub fn changed(&self) -> Vec<(&Path, VcsStatus)> {
        let mut changed: Vec<_> = self
            .statuses
            .iter()
            .filter(|(_, status)| **status != VcsStatus::NotVersionControlled)
            .map(|(path, status)| (path.as_path(), *status))
            .collect();
        changed.sort_by(|a, b| a.0.cmp(b.0));
        changed
    }

    /// Records `status` for `path`, then marks its ancestors below `root`.
    ///
    /// An unstaged change forces every ancestor to `Unstaged`. A staged change
    /// marks an ancestor `Staged` unless it is already `Unstaged`. The root
    /// itself is never marked.
    pub fn record_and_propagate(&mut self, root: &Path, path: &Path, status: VcsStatus) {
        if status == VcsStatus::NotVersionControlled {
            return;
        }
        self.merge(path.to_path_buf(), status);

        let mut current = path.parent();
        while let Some(dir) = current {
            if dir == root || !dir.starts_with(root) {
                break;
            }
            self.merge(dir.to_path_buf(), status);
            current = dir.parent();
        }
    }

    fn merge(&mut self, path: PathBuf, status: VcsStatus) {
        let slot = self.statuses.entry(path).or_default();
        if status == VcsStatus::Unstaged || *slot != VcsStatus::Unstaged {
            *slot = status;
        }
    }
}
