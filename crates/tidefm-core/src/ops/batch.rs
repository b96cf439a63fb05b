//! Shared driver for entry-batched operations.

use std::path::{Path, PathBuf};

use crate::error::CoreResult;
use crate::fs::entry::{EntryKind, FileEntry};
use crate::fs::ops::FileSystem;
use crate::outcome::Outcome;

/// An ordered entry list plus, per index, whether the entry is currently
/// applied.
///
/// Undo only touches applied entries and invoke only touches entries that
/// are not, so a partially failed invoke can be undone (and redone) safely.
#[derive(Debug, Clone)]
pub(crate) struct Batch {
    entries: Vec<FileEntry>,
    applied: Vec<bool>,
}

impl Batch {
    pub(crate) fn new(entries: Vec<FileEntry>) -> Self {
        let applied = vec![false; entries.len()];
        Self { entries, applied }
    }

    pub(crate) fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Runs `action` on every entry not yet applied, in input order.
    pub(crate) fn invoke<F>(&mut self, verb: &str, action: F) -> Outcome
    where
        F: FnMut(usize, &FileEntry) -> CoreResult<()>,
    {
        self.drive(verb, false, action)
    }

    /// Runs `action` on every applied entry, in input order.
    pub(crate) fn undo<F>(&mut self, verb: &str, action: F) -> Outcome
    where
        F: FnMut(usize, &FileEntry) -> CoreResult<()>,
    {
        self.drive(verb, true, action)
    }

    fn drive<F>(&mut self, verb: &str, want_applied: bool, mut action: F) -> Outcome
    where
        F: FnMut(usize, &FileEntry) -> CoreResult<()>,
    {
        let mut failures: Vec<String> = Vec::new();

        for (i, entry) in self.entries.iter().enumerate() {
            if self.applied[i] != want_applied {
                continue;
            }
            match action(i, entry) {
                Ok(()) => self.applied[i] = !want_applied,
                Err(e) => {
                    tracing::warn!("failed to {verb} {}: {e}", entry.path().display());
                    failures.push(format!("{} ({e})", entry.path().display()));
                }
            }
        }

        if failures.is_empty() {
            tracing::debug!("{verb}: {} item(s) done", self.entries.len());
            Outcome::ok()
        } else {
            Outcome::error(format!(
                "could not {verb} {} item(s): {}",
                failures.len(),
                failures.join(", ")
            ))
        }
    }
}

/// Target path for `entry` once placed into `dir`.
pub(crate) fn target_in(dir: &Path, entry: &FileEntry) -> PathBuf {
    dir.join(entry.name())
}

pub(crate) fn move_entry(
    fs: &dyn FileSystem,
    kind: EntryKind,
    src: &Path,
    dest: &Path,
) -> CoreResult<()> {
    match kind {
        EntryKind::File => fs.move_file(src, dest),
        EntryKind::Directory => fs.move_dir(src, dest),
    }
}

pub(crate) fn copy_entry(
    fs: &dyn FileSystem,
    kind: EntryKind,
    src: &Path,
    dest: &Path,
) -> CoreResult<()> {
    match kind {
        EntryKind::File => fs.copy_file(src, dest),
        EntryKind::Directory => fs.copy_dir(src, dest),
    }
}

pub(crate) fn delete_entry(fs: &dyn FileSystem, kind: EntryKind, path: &Path) -> CoreResult<()> {
    match kind {
        EntryKind::File => fs.delete_file(path),
        EntryKind::Directory => fs.delete_dir(path),
    }
}
