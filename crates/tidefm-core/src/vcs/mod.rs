//! Version-control status for the file views.
//!
//! [`VcsTracker`] binds to the repository containing the current directory
//! and keeps a [`StatusMap`] of changed paths, with folders inheriting the
//! status of what they contain. Repository access goes through
//! [`RepositoryClient`]; [`GitClient`] implements it with `git2`.

pub mod client;
pub mod commit;
pub mod status;
pub mod tracker;

pub use client::{GitClient, GitOpener, RepositoryClient, RepositoryOpener};
pub use commit::validate_commit_message;
pub use status::{StatusEntry, StatusMap, VcsStatus};
pub use tracker::{find_repository_root, VcsTracker};
