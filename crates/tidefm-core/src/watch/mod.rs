//! Directory watching by periodic snapshots.
//!
//! [`Snapshot`] records every path below a root; two snapshots diff into
//! [`ChangeEvent`](crate::event::ChangeEvent)s. [`DirectoryWatcher`] drives
//! that on a timer as a cancellable tokio task.

pub mod snapshot;
pub mod watcher;

pub use snapshot::Snapshot;
pub use watcher::DirectoryWatcher;
