//! TideFM core library: UI-agnostic file manager logic.
//!
//! `tidefm-core` provides the reversible file operations, directory watching,
//! and version-control status a file manager frontend needs. It does not
//! depend on any UI framework; the `tidefm` command-line tool is one
//! frontend built on it.
//!
//! # Modules
//!
//! - [`outcome`]: [`Outcome`], the value-or-messages result every user-facing call returns.
//! - [`error`]: collaborator error type ([`CoreError`]) and result alias ([`CoreResult`]).
//! - [`fs`]: [`FileEntry`], the [`FileSystem`] and [`Trash`] seams and their local implementations.
//! - [`naming`]: conflict-free name generation and name validation.
//! - [`ops`]: [`UndoableOperation`]s (create, rename, duplicate, move, copy, trash, flatten) and [`UndoHistory`].
//! - [`watch`]: snapshot diffing and the polling [`DirectoryWatcher`].
//! - [`event`]: [`ChangeEvent`]s produced by the watcher.
//! - [`vcs`]: [`VcsTracker`] and per-path [`VcsStatus`].
//! - [`config`]: TOML-based settings.

pub mod config;
pub mod error;
pub mod event;
pub mod fs;
pub mod naming;
pub mod ops;
pub mod outcome;
pub mod vcs;
pub mod watch;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use event::{ChangeEvent, ChangeKind};
pub use fs::{EntryKind, FileEntry, FileSystem, LocalFs, SystemTrash, Trash};
pub use ops::{
    CopyTo, DuplicateFiles, FlattenFolder, MoveTo, MoveToTrash, NewDirAt, NewFileAt,
    RenameMultiple, RenameOne, UndoHistory, UndoableOperation,
};
pub use outcome::Outcome;
pub use vcs::{VcsStatus, VcsTracker};
pub use watch::{DirectoryWatcher, Snapshot};
