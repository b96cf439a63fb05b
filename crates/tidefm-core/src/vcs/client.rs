//! Repository client seam and its `git2` implementation.
//!
//! The tracker talks to a repository only through [`RepositoryClient`], so
//! tests can substitute an in-memory client. [`GitClient`] is the real one.

use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, IndexAddOption, ObjectType, Repository, Status, StatusOptions};

use crate::error::{CoreError, CoreResult};
use crate::vcs::status::StatusEntry;

/// Operations on one opened repository.
///
/// Paths are relative to the repository root. Dropping the client releases
/// the repository handle.
pub trait RepositoryClient: Send {
    /// Every changed path, untracked included, ignored and clean excluded.
    fn status_entries(&self) -> CoreResult<Vec<StatusEntry>>;
    fn stage(&self, paths: &[PathBuf]) -> CoreResult<()>;
    fn unstage(&self, paths: &[PathBuf]) -> CoreResult<()>;
    /// Commits the index. The message is passed through as given.
    fn commit(&self, message: &str) -> CoreResult<()>;
    fn push(&self) -> CoreResult<()>;
    fn pull(&self) -> CoreResult<()>;
    /// Local branch names, sorted.
    fn branches(&self) -> CoreResult<Vec<String>>;
    /// The checked-out branch, or `None` when HEAD is detached or unborn.
    fn current_branch(&self) -> CoreResult<Option<String>>;
    fn switch_branch(&self, name: &str) -> CoreResult<()>;
}

/// Opens a [`RepositoryClient`] for a repository root.
pub trait RepositoryOpener: Send {
    fn open(&self, root: &Path) -> CoreResult<Box<dyn RepositoryClient>>;
}

/// Opens repositories with `git2`.
#[derive(Debug, Clone)]
pub struct GitOpener {
    remote: String,
}

impl GitOpener {
    /// `remote` is the remote name used by push and pull.
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
        }
    }
}

impl Default for GitOpener {
    fn default() -> Self {
        Self::new("origin")
    }
}

impl RepositoryOpener for GitOpener {
    fn open(&self, root: &Path) -> CoreResult<Box<dyn RepositoryClient>> {
        let repo = Repository::open(root)?;
        Ok(Box::new(GitClient {
            repo,
            remote: self.remote.clone(),
        }))
    }
}

/// [`RepositoryClient`] backed by a `git2::Repository`.
pub struct GitClient {
    repo: Repository,
    remote: String,
}

impl GitClient {
    fn workdir(&self) -> CoreResult<&Path> {
        self.repo
            .workdir()
            .ok_or_else(|| CoreError::Git("repository has no working directory".into()))
    }

    fn current_branch_required(&self) -> CoreResult<String> {
        self.current_branch()?
            .ok_or_else(|| CoreError::Git("HEAD is not on a branch".into()))
    }
}

fn index_side(s: Status) -> bool {
    s.is_index_new()
        || s.is_index_modified()
        || s.is_index_deleted()
        || s.is_index_renamed()
        || s.is_index_typechange()
}

fn worktree_side(s: Status) -> bool {
    s.is_wt_new()
        || s.is_wt_modified()
        || s.is_wt_deleted()
        || s.is_wt_renamed()
        || s.is_wt_typechange()
        || s.is_conflicted()
}

impl RepositoryClient for GitClient {
    fn status_entries(&self) -> CoreResult<Vec<StatusEntry>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .include_unmodified(false);
        let statuses = self.repo.statuses(Some(&mut opts))?;

        let entries = statuses
            .iter()
            .filter_map(|entry| {
                let path = entry.path()?;
                let status = entry.status();
                Some(StatusEntry::new(path, index_side(status), worktree_side(status)))
            })
            .collect();
        Ok(entries)
    }

    fn stage(&self, paths: &[PathBuf]) -> CoreResult<()> {
        let workdir = self.workdir()?.to_path_buf();
        let mut index = self.repo.index()?;
        for rel in paths {
            let full = workdir.join(rel);
            if full.is_dir() {
                index.add_all([rel.as_path()], IndexAddOption::DEFAULT, None)?;
                index.update_all([rel.as_path()], None)?;
            } else if full.symlink_metadata().is_ok() {
                index.add_path(rel)?;
            } else {
                index.remove_path(rel)?;
            }
        }
        index.write()?;
        Ok(())
    }

    fn unstage(&self, paths: &[PathBuf]) -> CoreResult<()> {
        match self.repo.head() {
            Ok(head) => {
                let target = head.peel(ObjectType::Commit)?;
                self.repo
                    .reset_default(Some(&target), paths.iter().map(PathBuf::as_path))?;
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let mut index = self.repo.index()?;
                for rel in paths {
                    index.remove_path(rel)?;
                }
                index.write()?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn commit(&self, message: &str) -> CoreResult<()> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<_> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        tracing::debug!("committed {oid}");
        Ok(())
    }

    fn push(&self) -> CoreResult<()> {
        let branch = self.current_branch_required()?;
        let mut remote = self.repo.find_remote(&self.remote)?;
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        remote.push(&[refspec.as_str()], None)?;
        tracing::debug!("pushed {branch} to {}", self.remote);
        Ok(())
    }

    fn pull(&self) -> CoreResult<()> {
        let branch = self.current_branch_required()?;
        let mut remote = self.repo.find_remote(&self.remote)?;
        remote.fetch(&[branch.as_str()], None, None)?;

        let fetch_commit = self.repo.find_reference("FETCH_HEAD")?.peel_to_commit()?;
        let annotated = self.repo.find_annotated_commit(fetch_commit.id())?;
        let (analysis, _) = self.repo.merge_analysis(&[&annotated])?;

        if analysis.is_up_to_date() {
            return Ok(());
        }
        if !analysis.is_fast_forward() {
            return Err(CoreError::Git(format!(
                "cannot fast-forward {branch} to {}; merge required",
                fetch_commit.id()
            )));
        }

        // Check out against the old HEAD first so local edits are protected.
        self.repo
            .checkout_tree(fetch_commit.as_object(), Some(CheckoutBuilder::new().safe()))?;
        let mut reference = self.repo.find_reference(&format!("refs/heads/{branch}"))?;
        reference.set_target(
            fetch_commit.id(),
            &format!("pull: fast-forward to {}", fetch_commit.id()),
        )?;
        tracing::debug!("fast-forwarded {branch} to {}", fetch_commit.id());
        Ok(())
    }

    fn branches(&self) -> CoreResult<Vec<String>> {
        let mut names = Vec::new();
        for item in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = item?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn current_branch(&self) -> CoreResult<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(str::to_string))
    }

    fn switch_branch(&self, name: &str) -> CoreResult<()> {
        let branch = self.repo.find_branch(name, BranchType::Local)?;
        let reference = branch.get();
        let refname = reference
            .name()
            .ok_or_else(|| CoreError::Git(format!("branch {name} has a non UTF-8 name")))?
            .to_string();
        let target = reference.peel(ObjectType::Commit)?;

        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
        self.repo.set_head(&refname)?;
        tracing::debug!("switched to {name}");
        Ok(())
    }
}
