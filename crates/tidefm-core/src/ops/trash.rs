//! Move entries to the trash and restore them on undo.

use std::sync::Arc;

use crate::fs::entry::FileEntry;
use crate::fs::trash::Trash;
use crate::ops::batch::Batch;
use crate::ops::UndoableOperation;
use crate::outcome::Outcome;

/// Sends every entry to the trash; undo restores each to its original path.
pub struct MoveToTrash {
    trash: Arc<dyn Trash>,
    batch: Batch,
}

impl MoveToTrash {
    pub fn new(trash: Arc<dyn Trash>, entries: Vec<FileEntry>) -> Self {
        Self {
            trash,
            batch: Batch::new(entries),
        }
    }
}

impl UndoableOperation for MoveToTrash {
    fn invoke(&mut self) -> Outcome {
        let trash = &self.trash;
        self.batch
            .invoke("move to trash", |_, entry| trash.trash(entry.path()))
    }

    fn undo(&mut self) -> Outcome {
        let trash = &self.trash;
        self.batch
            .undo("restore from trash", |_, entry| trash.restore(entry.path()))
    }

    fn description(&self) -> String {
        format!("Move {} item(s) to trash", self.batch.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, CoreResult};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Trash that parks items in a private directory, keyed by original path.
    struct DirTrash {
        bin: PathBuf,
        parked: Mutex<Vec<(PathBuf, PathBuf)>>,
    }

    impl DirTrash {
        fn new(bin: PathBuf) -> Self {
            fs::create_dir_all(&bin).unwrap();
            Self {
                bin,
                parked: Mutex::new(Vec::new()),
            }
        }
    }

    impl Trash for DirTrash {
        fn trash(&self, path: &Path) -> CoreResult<()> {
            if !path.exists() {
                return Err(CoreError::NotFound(path.to_path_buf()));
            }
            let mut parked = self.parked.lock().unwrap();
            let slot = self.bin.join(parked.len().to_string());
            fs::rename(path, &slot)?;
            parked.push((path.to_path_buf(), slot));
            Ok(())
        }

        fn restore(&self, original_path: &Path) -> CoreResult<()> {
            let mut parked = self.parked.lock().unwrap();
            let idx = parked
                .iter()
                .rposition(|(orig, _)| orig == original_path)
                .ok_or_else(|| CoreError::Trash("not in trash".to_string()))?;
            let (orig, slot) = parked.remove(idx);
            fs::rename(slot, orig)?;
            Ok(())
        }
    }

    #[test]
    fn trash_and_restore_round_trip() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        let dir = tmp.path().join("folder");
        fs::write(&file, "a").unwrap();
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("inner.txt"), "i").unwrap();
        let trash = Arc::new(DirTrash::new(tmp.path().join(".bin")));

        let mut op = MoveToTrash::new(
            trash,
            vec![FileEntry::file(&file), FileEntry::directory(&dir)],
        );

        assert!(op.invoke().is_ok());
        assert!(!file.exists());
        assert!(!dir.exists());

        assert!(op.undo().is_ok());
        assert_eq!(fs::read_to_string(&file).unwrap(), "a");
        assert!(dir.join("inner.txt").exists());
    }

    #[test]
    fn missing_entry_is_reported_and_others_trashed() {
        let tmp = TempDir::new().unwrap();
        let present = tmp.path().join("present.txt");
        fs::write(&present, "").unwrap();
        let missing = tmp.path().join("missing.txt");
        let trash = Arc::new(DirTrash::new(tmp.path().join(".bin")));

        let mut op = MoveToTrash::new(
            trash,
            vec![FileEntry::file(&missing), FileEntry::file(&present)],
        );
        let outcome = op.invoke();

        assert!(outcome.is_err());
        assert!(outcome.messages()[0].contains("missing.txt"));
        assert!(!present.exists());

        assert!(op.undo().is_ok());
        assert!(present.exists());
    }
}
