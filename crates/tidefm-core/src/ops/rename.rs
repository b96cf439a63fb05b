//! Rename entries in place.

use std::path::Path;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::{paths_equal, FileEntry};
use crate::fs::ops::FileSystem;
use crate::naming;
use crate::ops::batch::Batch;
use crate::ops::UndoableOperation;
use crate::outcome::Outcome;

fn rename_to(fs: &dyn FileSystem, entry: &FileEntry, new_name: &str) -> CoreResult<()> {
    naming::validate_name(new_name)?;
    fs.rename(entry.path(), new_name)
}

fn rename_back(fs: &dyn FileSystem, entry: &FileEntry, new_name: &str) -> CoreResult<()> {
    let parent = entry
        .parent()
        .ok_or_else(|| CoreError::TopLevelDirectory(entry.path().to_path_buf()))?;
    fs.rename(&parent.join(new_name), entry.name())
}

/// Renames each entry to a pre-generated name; undo restores the original
/// names.
pub struct RenameMultiple {
    fs: Arc<dyn FileSystem>,
    batch: Batch,
    new_names: Vec<String>,
}

impl RenameMultiple {
    /// Uses `new_names`, index-aligned with `entries`.
    pub fn new(fs: Arc<dyn FileSystem>, entries: Vec<FileEntry>, new_names: Vec<String>) -> Self {
        Self {
            fs,
            batch: Batch::new(entries),
            new_names,
        }
    }

    /// Generates `"{pattern} ({n}){ext}"` names for entries that share one
    /// parent directory.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidName`] if `pattern` is not a valid name or the
    ///   entries live in different directories.
    /// - [`CoreError::TopLevelDirectory`] if an entry has no parent.
    pub fn with_pattern(
        fs: Arc<dyn FileSystem>,
        entries: Vec<FileEntry>,
        pattern: &str,
    ) -> CoreResult<Self> {
        naming::validate_name(pattern)?;
        let new_names = match entries.first() {
            None => Vec::new(),
            Some(first) => {
                let dir = first
                    .parent()
                    .ok_or_else(|| CoreError::TopLevelDirectory(first.path().to_path_buf()))?;
                let shared = entries
                    .iter()
                    .all(|e| e.parent().is_some_and(|p| paths_equal(p, dir)));
                if !shared {
                    return Err(CoreError::InvalidName(
                        "entries renamed to a pattern must share a directory".to_string(),
                    ));
                }
                naming::available_names(fs.as_ref(), dir, &entries, pattern)
            }
        };
        Ok(Self::new(fs, entries, new_names))
    }

    /// The names applied by `invoke`, index-aligned with the entries.
    pub fn new_names(&self) -> &[String] {
        &self.new_names
    }

    /// The entries as they are named after `invoke`.
    pub fn renamed_entries(&self) -> Vec<FileEntry> {
        self.batch
            .entries()
            .iter()
            .zip(&self.new_names)
            .map(|(entry, name)| {
                let parent = entry.parent().unwrap_or_else(|| Path::new(""));
                entry.with_path(parent.join(name))
            })
            .collect()
    }
}

impl UndoableOperation for RenameMultiple {
    fn invoke(&mut self) -> Outcome {
        if self.new_names.len() != self.batch.len() {
            return Outcome::error(format!(
                "expected {} new names, got {}",
                self.batch.len(),
                self.new_names.len()
            ));
        }
        let fs = self.fs.as_ref();
        let names = &self.new_names;
        self.batch
            .invoke("rename", |i, entry| rename_to(fs, entry, &names[i]))
    }

    fn undo(&mut self) -> Outcome {
        let fs = self.fs.as_ref();
        let names = &self.new_names;
        self.batch
            .undo("restore name of", |i, entry| rename_back(fs, entry, &names[i]))
    }

    fn description(&self) -> String {
        format!("Rename {} item(s)", self.batch.len())
    }
}

/// Renames a single entry. Failures are reported as the entry's own error
/// rather than an aggregate.
pub struct RenameOne {
    fs: Arc<dyn FileSystem>,
    entry: FileEntry,
    new_name: String,
    applied: bool,
}

impl RenameOne {
    pub fn new(fs: Arc<dyn FileSystem>, entry: FileEntry, new_name: impl Into<String>) -> Self {
        Self {
            fs,
            entry,
            new_name: new_name.into(),
            applied: false,
        }
    }

    /// The entry as it is named after `invoke`.
    pub fn renamed_entry(&self) -> FileEntry {
        let parent = self.entry.parent().unwrap_or_else(|| Path::new(""));
        self.entry.with_path(parent.join(&self.new_name))
    }
}

impl UndoableOperation for RenameOne {
    fn invoke(&mut self) -> Outcome {
        if self.applied {
            return Outcome::ok();
        }
        tracing::debug!("renaming {} to {}", self.entry.path().display(), self.new_name);
        match rename_to(self.fs.as_ref(), &self.entry, &self.new_name) {
            Ok(()) => {
                self.applied = true;
                Outcome::ok()
            }
            Err(e) => e.into(),
        }
    }

    fn undo(&mut self) -> Outcome {
        if !self.applied {
            return Outcome::ok();
        }
        match rename_back(self.fs.as_ref(), &self.entry, &self.new_name) {
            Ok(()) => {
                self.applied = false;
                Outcome::ok()
            }
            Err(e) => e.into(),
        }
    }

    fn description(&self) -> String {
        format!("Rename '{}' to '{}'", self.entry.name(), self.new_name)
    }
}
