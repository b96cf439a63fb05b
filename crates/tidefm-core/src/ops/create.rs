//! Create empty files and directories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::EntryKind;
use crate::fs::ops::FileSystem;
use crate::naming;
use crate::ops::batch::delete_entry;
use crate::ops::UndoableOperation;
use crate::outcome::Outcome;

/// Shared state of the two create operations.
struct Creation {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    kind: EntryKind,
    applied: bool,
}

impl Creation {
    fn check(&self) -> CoreResult<()> {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CoreError::TopLevelDirectory(self.path.clone()))?;
        naming::validate_name(&name)?;
        if self.fs.exists(&self.path) {
            return Err(CoreError::AlreadyExists(self.path.clone()));
        }
        Ok(())
    }

    fn invoke(&mut self) -> Outcome {
        if self.applied {
            return Outcome::ok();
        }
        let result = self.check().and_then(|()| match self.kind {
            EntryKind::File => self.fs.create_file(&self.path),
            EntryKind::Directory => self.fs.create_dir(&self.path),
        });
        match result {
            Ok(()) => {
                tracing::debug!("created {}", self.path.display());
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
        match delete_entry(self.fs.as_ref(), self.kind, &self.path) {
            Ok(()) => {
                self.applied = false;
                Outcome::ok()
            }
            Err(e) => e.into(),
        }
    }
}

/// Creates an empty file; undo deletes it.
pub struct NewFileAt(Creation);

impl NewFileAt {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self(Creation {
            fs,
            path: path.into(),
            kind: EntryKind::File,
            applied: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.0.path
    }
}

impl UndoableOperation for NewFileAt {
    fn invoke(&mut self) -> Outcome {
        self.0.invoke()
    }

    fn undo(&mut self) -> Outcome {
        self.0.undo()
    }

    fn description(&self) -> String {
        format!("New file {}", self.0.path.display())
    }
}

/// Creates an empty directory; undo deletes it.
pub struct NewDirAt(Creation);

impl NewDirAt {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self(Creation {
            fs,
            path: path.into(),
            kind: EntryKind::Directory,
            applied: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.0.path
    }
}

impl UndoableOperation for NewDirAt {
    fn invoke(&mut self) -> Outcome {
        self.0.invoke()
    }

    fn undo(&mut self) -> Outcome {
        self.0.undo()
    }

    fn description(&self) -> String {
        format!("New folder {}", self.0.path.display())
    }
}
