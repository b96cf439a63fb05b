//! File system abstractions for TideFM.
//!
//! This module provides the entry value type ([`entry::FileEntry`]) and the
//! collaborators the operations are built on: raw I/O ([`ops::FileSystem`])
//! and the trash ([`trash::Trash`]).

pub mod entry;
pub mod ops;
pub mod trash;

pub use entry::{names_equal, paths_equal, EntryKind, FileEntry};
pub use ops::{FileSystem, LocalFs};
pub use trash::{SystemTrash, Trash};
