//! Reversible file operations.
//!
//! Every user-initiated mutation is an [`UndoableOperation`]: `invoke`
//! applies it, `undo` reverses it, and both report an [`Outcome`]. Batch
//! operations act on an ordered list of entries through a shared driver
//! that keeps going past per-entry failures and reports every failing
//! entry in one aggregate message.
//!
//! Operations assume serialized access: nothing else may touch the same
//! paths while `invoke` or `undo` runs.

mod batch;
pub mod create;
pub mod duplicate;
pub mod flatten;
pub mod history;
pub mod rename;
pub mod transfer;
pub mod trash;

pub use create::{NewDirAt, NewFileAt};
pub use duplicate::DuplicateFiles;
pub use flatten::FlattenFolder;
pub use history::UndoHistory;
pub use rename::{RenameMultiple, RenameOne};
pub use transfer::{CopyTo, MoveTo};
pub use trash::MoveToTrash;

use crate::outcome::Outcome;

/// A user-initiated, reversible action.
///
/// Calling `invoke` again after `undo` re-applies the action. Repeating
/// either call is only meaningful while the captured state still matches
/// the filesystem; after external changes the result is unspecified.
pub trait UndoableOperation: Send {
    /// Applies the operation.
    fn invoke(&mut self) -> Outcome;

    /// Reverses whatever the last `invoke` applied.
    fn undo(&mut self) -> Outcome;

    /// Short human-readable label, e.g. for an undo menu.
    fn description(&self) -> String;
}
