//! Duplicate entries next to themselves.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;
use crate::fs::ops::FileSystem;
use crate::naming;
use crate::ops::batch::{copy_entry, delete_entry, Batch};
use crate::ops::UndoableOperation;
use crate::outcome::Outcome;

/// Copies each entry within its own parent directory under a pre-generated
/// name; undo deletes the duplicates.
pub struct DuplicateFiles {
    fs: Arc<dyn FileSystem>,
    batch: Batch,
    copy_names: Vec<String>,
}

impl DuplicateFiles {
    /// Uses `copy_names`, index-aligned with `entries`.
    pub fn new(fs: Arc<dyn FileSystem>, entries: Vec<FileEntry>, copy_names: Vec<String>) -> Self {
        Self {
            fs,
            batch: Batch::new(entries),
            copy_names,
        }
    }

    /// Generates a `"{stem} - Copy{ext}"` name for every entry.
    pub fn with_generated_names(fs: Arc<dyn FileSystem>, entries: Vec<FileEntry>) -> Self {
        let copy_names = entries
            .iter()
            .map(|entry| match entry.parent() {
                Some(dir) => naming::copy_name(fs.as_ref(), dir, entry),
                None => entry.name().to_string(),
            })
            .collect();
        Self::new(fs, entries, copy_names)
    }

    /// The names the duplicates receive, index-aligned with the entries.
    pub fn copy_names(&self) -> &[String] {
        &self.copy_names
    }

    fn duplicate_path(entry: &FileEntry, name: &str) -> CoreResult<PathBuf> {
        entry
            .parent()
            .map(|dir: &Path| dir.join(name))
            .ok_or_else(|| CoreError::TopLevelDirectory(entry.path().to_path_buf()))
    }
}

impl UndoableOperation for DuplicateFiles {
    fn invoke(&mut self) -> Outcome {
        if self.copy_names.len() != self.batch.len() {
            return Outcome::error(format!(
                "expected {} copy names, got {}",
                self.batch.len(),
                self.copy_names.len()
            ));
        }
        let fs = self.fs.as_ref();
        let names = &self.copy_names;
        self.batch.invoke("duplicate", |i, entry| {
            naming::validate_name(&names[i])?;
            let target = Self::duplicate_path(entry, &names[i])?;
            copy_entry(fs, entry.kind(), entry.path(), &target)
        })
    }

    fn undo(&mut self) -> Outcome {
        let fs = self.fs.as_ref();
        let names = &self.copy_names;
        self.batch.undo("delete duplicate of", |i, entry| {
            let target = Self::duplicate_path(entry, &names[i])?;
            delete_entry(fs, entry.kind(), &target)
        })
    }

    fn description(&self) -> String {
        format!("Duplicate {} item(s)", self.batch.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::ops::LocalFs;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn duplicates_next_to_originals_and_undo_removes_them() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), "n").unwrap();
        fs::create_dir_all(tmp.path().join("album/inner")).unwrap();

        let mut op = DuplicateFiles::with_generated_names(
            Arc::new(LocalFs),
            vec![
                FileEntry::file(tmp.path().join("notes.txt")),
                FileEntry::directory(tmp.path().join("album")),
            ],
        );
        assert_eq!(op.copy_names(), ["notes - Copy.txt", "album - Copy"]);

        assert!(op.invoke().is_ok());
        assert_eq!(
            fs::read_to_string(tmp.path().join("notes - Copy.txt")).unwrap(),
            "n"
        );
        assert!(tmp.path().join("album - Copy/inner").is_dir());

        assert!(op.undo().is_ok());
        assert!(!tmp.path().join("notes - Copy.txt").exists());
        assert!(!tmp.path().join("album - Copy").exists());
        assert!(tmp.path().join("notes.txt").exists());
        assert!(tmp.path().join("album/inner").is_dir());
    }

    #[test]
    fn existing_copy_name_gets_numbered() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "").unwrap();
        fs::write(tmp.path().join("a - Copy.txt"), "").unwrap();

        let op = DuplicateFiles::with_generated_names(
            Arc::new(LocalFs),
            vec![FileEntry::file(tmp.path().join("a.txt"))],
        );

        assert_eq!(op.copy_names(), ["a - Copy (1).txt"]);
    }

    #[test]
    fn mismatched_name_list_is_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "").unwrap();

        let mut op = DuplicateFiles::new(
            Arc::new(LocalFs),
            vec![FileEntry::file(tmp.path().join("a.txt"))],
            Vec::new(),
        );

        assert!(op.invoke().is_err());
    }
}
