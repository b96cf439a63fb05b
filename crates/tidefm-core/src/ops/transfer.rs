//! Move and copy entries into a destination directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;
use crate::fs::ops::FileSystem;
use crate::ops::batch::{copy_entry, delete_entry, move_entry, target_in, Batch};
use crate::ops::UndoableOperation;
use crate::outcome::Outcome;

fn check_destination(fs: &dyn FileSystem, dest: &Path) -> CoreResult<()> {
    if !fs.exists(dest) {
        return Err(CoreError::NotFound(dest.to_path_buf()));
    }
    if !fs.is_dir(dest) {
        return Err(CoreError::NotADirectory(dest.to_path_buf()));
    }
    Ok(())
}

/// Moves every entry into `dest`; undo moves each back to the directory it
/// came from.
pub struct MoveTo {
    fs: Arc<dyn FileSystem>,
    batch: Batch,
    dest: PathBuf,
    origins: Vec<Option<PathBuf>>,
}

impl MoveTo {
    pub fn new(fs: Arc<dyn FileSystem>, entries: Vec<FileEntry>, dest: impl Into<PathBuf>) -> Self {
        let origins = entries
            .iter()
            .map(|e| e.parent().map(Path::to_path_buf))
            .collect();
        Self {
            fs,
            batch: Batch::new(entries),
            dest: dest.into(),
            origins,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.dest
    }
}

impl UndoableOperation for MoveTo {
    fn invoke(&mut self) -> Outcome {
        if let Err(e) = check_destination(self.fs.as_ref(), &self.dest) {
            return e.into();
        }
        tracing::debug!("moving {} item(s) to {}", self.batch.len(), self.dest.display());
        let fs = self.fs.as_ref();
        let dest = &self.dest;
        let origins = &self.origins;
        self.batch.invoke("move", |i, entry| {
            if origins[i].is_none() {
                return Err(CoreError::TopLevelDirectory(entry.path().to_path_buf()));
            }
            move_entry(fs, entry.kind(), entry.path(), &target_in(dest, entry))
        })
    }

    fn undo(&mut self) -> Outcome {
        let fs = self.fs.as_ref();
        let dest = &self.dest;
        let origins = &self.origins;
        self.batch.undo("move back", |i, entry| {
            let origin = origins[i]
                .as_deref()
                .ok_or_else(|| CoreError::TopLevelDirectory(entry.path().to_path_buf()))?;
            move_entry(fs, entry.kind(), &target_in(dest, entry), &target_in(origin, entry))
        })
    }

    fn description(&self) -> String {
        format!(
            "Move {} item(s) to {}",
            self.batch.len(),
            self.dest.display()
        )
    }
}

/// Copies every entry into `dest`; undo deletes the copies.
pub struct CopyTo {
    fs: Arc<dyn FileSystem>,
    batch: Batch,
    dest: PathBuf,
}

impl CopyTo {
    pub fn new(fs: Arc<dyn FileSystem>, entries: Vec<FileEntry>, dest: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            batch: Batch::new(entries),
            dest: dest.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.dest
    }
}

impl UndoableOperation for CopyTo {
    fn invoke(&mut self) -> Outcome {
        if let Err(e) = check_destination(self.fs.as_ref(), &self.dest) {
            return e.into();
        }
        tracing::debug!("copying {} item(s) to {}", self.batch.len(), self.dest.display());
        let fs = self.fs.as_ref();
        let dest = &self.dest;
        self.batch.invoke("copy", |_, entry| {
            copy_entry(fs, entry.kind(), entry.path(), &target_in(dest, entry))
        })
    }

    fn undo(&mut self) -> Outcome {
        let fs = self.fs.as_ref();
        let dest = &self.dest;
        self.batch.undo("delete copy of", |_, entry| {
            delete_entry(fs, entry.kind(), &target_in(dest, entry))
        })
    }

    fn description(&self) -> String {
        format!(
            "Copy {} item(s) to {}",
            self.batch.len(),
            self.dest.display()
        )
    }
}
