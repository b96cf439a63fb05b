//! Tracks the repository that contains the current directory.

use std::path::{Path, PathBuf};

use crate::config::VcsConfig;
use crate::error::{CoreError, CoreResult};
use crate::outcome::Outcome;
use crate::vcs::client::{GitOpener, RepositoryClient, RepositoryOpener};
use crate::vcs::commit::validate_commit_message;
use crate::vcs::status::{StatusMap, VcsStatus};

/// Name of the entry that marks a repository root.
const REPOSITORY_MARKER: &str = ".git";

struct Binding {
    root: PathBuf,
    marker: PathBuf,
    client: Box<dyn RepositoryClient>,
}

/// Holds at most one open repository and the status of every changed path
/// in it.
///
/// Pass the tracker to whatever needs status; it is not meant to be shared
/// across threads. Switching to a directory in another repository releases
/// the previous one first. Dropping the tracker releases the binding.
pub struct VcsTracker {
    opener: Box<dyn RepositoryOpener>,
    binding: Option<Binding>,
    statuses: StatusMap,
}

/// Walks up from `dir` to the nearest directory holding a `.git` entry.
///
/// A relative `dir` is resolved against the working directory first, so the
/// returned root is always absolute.
pub fn find_repository_root(dir: &Path) -> Option<PathBuf> {
    let dir = std::path::absolute(dir).ok()?;
    dir.ancestors()
        .find(|candidate| candidate.join(REPOSITORY_MARKER).symlink_metadata().is_ok())
        .map(Path::to_path_buf)
}

fn not_bound() -> CoreError {
    CoreError::Git("not inside a repository".into())
}

impl VcsTracker {
    pub fn new(opener: Box<dyn RepositoryOpener>) -> Self {
        Self {
            opener,
            binding: None,
            statuses: StatusMap::new(),
        }
    }

    /// A tracker using `git2`, pushing and pulling through the configured
    /// remote.
    pub fn with_git(config: &VcsConfig) -> Self {
        Self::new(Box::new(GitOpener::new(config.remote.clone())))
    }

    /// Binds to the repository containing `dir` and refreshes statuses.
    ///
    /// Staying inside the same repository only refreshes. Leaving every
    /// repository releases the binding and every path reads as
    /// [`VcsStatus::NotVersionControlled`].
    pub fn set_root(&mut self, dir: &Path) -> Outcome {
        let Some(root) = find_repository_root(dir) else {
            self.release();
            return Outcome::ok();
        };
        let marker = root.join(REPOSITORY_MARKER);

        let same = self
            .binding
            .as_ref()
            .is_some_and(|binding| binding.marker == marker);
        if !same {
            self.release();
            match self.opener.open(&root) {
                Ok(client) => {
                    tracing::info!("bound repository {}", root.display());
                    self.binding = Some(Binding {
                        root,
                        marker,
                        client,
                    });
                }
                Err(e) => {
                    tracing::warn!("could not open repository {}: {e}", root.display());
                    return e.into();
                }
            }
        }
        self.refresh()
    }

    /// Rebuilds the status map from the repository client.
    pub fn refresh(&mut self) -> Outcome {
        let Some(binding) = &self.binding else {
            self.statuses.clear();
            return Outcome::ok();
        };
        match binding.client.status_entries() {
            Ok(entries) => {
                self.statuses = StatusMap::from_entries(&binding.root, &entries);
                tracing::debug!(
                    "refreshed {}: {} changed path(s)",
                    binding.root.display(),
                    entries.len()
                );
                Outcome::ok()
            }
            Err(e) => {
                tracing::warn!("status query failed for {}: {e}", binding.root.display());
                e.into()
            }
        }
    }

    pub fn status(&self, path: &Path) -> VcsStatus {
        if self.binding.is_none() {
            return VcsStatus::NotVersionControlled;
        }
        self.statuses.get(path)
    }

    pub fn statuses(&self) -> &StatusMap {
        &self.statuses
    }

    pub fn repository_root(&self) -> Option<&Path> {
        self.binding.as_ref().map(|b| b.root.as_path())
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn stage(&mut self, paths: &[PathBuf]) -> Outcome {
        let result = self
            .relative(paths)
            .and_then(|(client, rel)| client.stage(&rel));
        self.refresh_after(result)
    }

    pub fn unstage(&mut self, paths: &[PathBuf]) -> Outcome {
        let result = self
            .relative(paths)
            .and_then(|(client, rel)| client.unstage(&rel));
        self.refresh_after(result)
    }

    /// Validates and trims `message`, then commits the index. An invalid
    /// message never reaches the repository.
    pub fn commit(&mut self, message: &str) -> Outcome {
        let result = validate_commit_message(message)
            .and_then(|message| self.client()?.commit(&message));
        self.refresh_after(result)
    }

    pub fn push(&self) -> Outcome {
        self.client().and_then(|client| client.push()).into()
    }

    pub fn pull(&mut self) -> Outcome {
        let result = self.client().and_then(|client| client.pull());
        self.refresh_after(result)
    }

    pub fn branches(&self) -> Outcome<Vec<String>> {
        self.client().and_then(|client| client.branches()).into()
    }

    pub fn current_branch(&self) -> Outcome<Option<String>> {
        self.client()
            .and_then(|client| client.current_branch())
            .into()
    }

    pub fn switch_branch(&mut self, name: &str) -> Outcome {
        let result = self.client().and_then(|client| client.switch_branch(name));
        self.refresh_after(result)
    }

    /// Drops the repository binding and clears every status.
    pub fn release(&mut self) {
        if let Some(binding) = self.binding.take() {
            tracing::info!("released repository {}", binding.root.display());
        }
        self.statuses.clear();
    }

    fn client(&self) -> CoreResult<&dyn RepositoryClient> {
        self.binding
            .as_ref()
            .map(|b| b.client.as_ref())
            .ok_or_else(not_bound)
    }

    /// Paths relative to the repository root, as the client expects them.
    fn relative(&self, paths: &[PathBuf]) -> CoreResult<(&dyn RepositoryClient, Vec<PathBuf>)> {
        let binding = self.binding.as_ref().ok_or_else(not_bound)?;
        let rel = paths
            .iter()
            .map(|path| {
                if path.is_relative() {
                    return Ok(path.clone());
                }
                path.strip_prefix(&binding.root)
                    .map(Path::to_path_buf)
                    .map_err(|_| {
                        CoreError::Git(format!("{} is outside the repository", path.display()))
                    })
            })
            .collect::<CoreResult<Vec<_>>>()?;
        Ok((binding.client.as_ref(), rel))
    }

    fn refresh_after(&mut self, result: CoreResult<()>) -> Outcome {
        match result {
            Ok(()) => self.refresh(),
            Err(e) => e.into(),
        }
    }
}

impl Drop for VcsTracker {
    fn drop(&mut self) {
        self.release();
    }
}
