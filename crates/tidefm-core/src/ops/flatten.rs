//! Flatten a folder: pull its immediate children up into the parent and
//! remove the emptied folder.
//!
//! The steps are best-effort and not transactional. When a move fails the
//! children already moved stay where they are and the folder is kept; undo
//! is the recovery path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::{names_equal, EntryKind, FileEntry};
use crate::fs::ops::FileSystem;
use crate::naming;
use crate::ops::batch::move_entry;
use crate::ops::UndoableOperation;
use crate::outcome::Outcome;

/// State captured by a flatten, needed to undo it.
#[derive(Debug, Clone)]
struct Flattened {
    parent: PathBuf,
    /// Where the folder lived while being emptied. Differs from the original
    /// path when the folder had to be renamed out of the way first.
    working: PathBuf,
    /// The folder's immediate children at flatten time.
    children: Vec<FileEntry>,
}

/// Moves every immediate child of a directory into its parent, then deletes
/// the directory. Undo recreates the directory and moves the children back.
pub struct FlattenFolder {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
    state: Option<Flattened>,
}

fn file_name_of(path: &Path) -> CoreResult<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CoreError::TopLevelDirectory(path.to_path_buf()))
}

impl FlattenFolder {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
            state: None,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Children captured by the last invoke, if any.
    pub fn captured_children(&self) -> &[FileEntry] {
        self.state
            .as_ref()
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
    }

    /// Renames the folder out of the way when one of its own children
    /// carries the folder's name, so that child can land in the parent.
    fn make_room(&self, parent: &Path, dir_name: &str) -> CoreResult<PathBuf> {
        let fs = self.fs.as_ref();
        let clashes = fs
            .list(&self.dir)?
            .iter()
            .any(|child| names_equal(child.name(), dir_name));
        if !clashes {
            return Ok(self.dir.clone());
        }

        let dirs = [parent, self.dir.as_path()];
        let substitute = naming::available_name_in_all(fs, dir_name, EntryKind::Directory, &dirs);
        tracing::debug!(
            "renaming {} to {substitute} before flattening",
            self.dir.display()
        );
        fs.rename(&self.dir, &substitute)?;
        Ok(parent.join(substitute))
    }

    fn flatten(&mut self) -> Outcome {
        let fs = Arc::clone(&self.fs);
        let fs = fs.as_ref();

        let Some(parent) = self.dir.parent().map(Path::to_path_buf) else {
            return CoreError::TopLevelDirectory(self.dir.clone()).into();
        };
        let dir_name = match file_name_of(&self.dir) {
            Ok(name) => name,
            Err(e) => return e.into(),
        };
        if !fs.is_dir(&self.dir) {
            return if fs.exists(&self.dir) {
                CoreError::NotADirectory(self.dir.clone()).into()
            } else {
                CoreError::NotFound(self.dir.clone()).into()
            };
        }

        let working = match self.make_room(&parent, &dir_name) {
            Ok(path) => path,
            Err(e) => return e.into(),
        };
        self.state = Some(Flattened {
            parent: parent.clone(),
            working: working.clone(),
            children: Vec::new(),
        });

        let mut children = match fs.list(&working) {
            Ok(children) => children,
            Err(e) => return e.into(),
        };
        // Subdirectories first, then files.
        children.sort_by_key(|c| (!c.is_dir(), c.name().to_string()));
        if let Some(state) = self.state.as_mut() {
            state.children = children.clone();
        }

        let mut outcome = Outcome::ok();
        for child in &children {
            let moved = move_entry(fs, child.kind(), child.path(), &parent.join(child.name()));
            if let Err(e) = &moved {
                tracing::warn!("flatten could not move {}: {e}", child.path().display());
            }
            outcome = outcome.merge(Outcome::from(moved));
        }

        if outcome.is_ok() {
            outcome = outcome.merge(Outcome::from(fs.delete_dir(&working)));
        } else {
            tracing::warn!("keeping {} after failed moves", working.display());
        }
        outcome
    }

    fn unflatten(&mut self, state: Flattened) -> (Outcome, Option<Flattened>) {
        let fs = Arc::clone(&self.fs);
        let fs = fs.as_ref();
        let Flattened {
            parent,
            working,
            children,
        } = state;

        let slot = if fs.exists(&working) {
            if !fs.is_dir(&working) {
                let err = CoreError::NotADirectory(working.clone());
                return (err.into(), Some(Flattened { parent, working, children }));
            }
            let current = match fs.list(&working) {
                Ok(current) => current,
                Err(e) => return (e.into(), Some(Flattened { parent, working, children })),
            };
            let holds_ours = children
                .iter()
                .any(|c| current.iter().any(|e| names_equal(e.name(), c.name())));
            if !children.is_empty() && !holds_ours {
                let message = format!(
                    "cannot undo flatten: {} is occupied by unrelated content",
                    working.display()
                );
                return (Outcome::error(message), Some(Flattened { parent, working, children }));
            }
            working
        } else {
            let slot_name = match file_name_of(&working) {
                Ok(name) => name,
                Err(e) => return (e.into(), None),
            };
            let name = naming::available_name_of_kind(fs, &parent, &slot_name, EntryKind::Directory);
            let slot = parent.join(name);
            if let Err(e) = fs.create_dir(&slot) {
                return (e.into(), Some(Flattened { parent, working, children }));
            }
            slot
        };

        let mut outcome = Outcome::ok();
        for child in &children {
            let current = parent.join(child.name());
            let home = slot.join(child.name());
            if fs.exists(&home) {
                // Never left during a partial flatten.
                continue;
            }
            outcome = outcome.merge(Outcome::from(move_entry(fs, child.kind(), &current, &home)));
        }

        if outcome.is_err() {
            let remaining = Flattened {
                parent,
                working: slot,
                children,
            };
            return (outcome, Some(remaining));
        }

        if slot != self.dir {
            let original_name = match file_name_of(&self.dir) {
                Ok(name) => name,
                Err(e) => return (e.into(), None),
            };
            if let Err(e) = fs.rename(&slot, &original_name) {
                let remaining = Flattened {
                    parent,
                    working: slot,
                    children,
                };
                return (e.into(), Some(remaining));
            }
        }

        (outcome, None)
    }
}

impl UndoableOperation for FlattenFolder {
    fn invoke(&mut self) -> Outcome {
        if self.state.is_some() {
            return Outcome::error(format!(
                "{} is already flattened; undo first",
                self.dir.display()
            ));
        }
        tracing::debug!("flattening {}", self.dir.display());
        self.flatten()
    }

    fn undo(&mut self) -> Outcome {
        // Nothing captured means there is nothing to put back.
        let Some(state) = self.state.take() else {
            return Outcome::ok();
        };
        tracing::debug!("restoring flattened folder {}", self.dir.display());
        let (outcome, remaining) = self.unflatten(state);
        self.state = remaining;
        outcome
    }

    fn description(&self) -> String {
        format!("Flatten {}", self.dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::ops::LocalFs;
    use std::fs;
    use tempfile::TempDir;

    fn flatten_op(dir: &Path) -> FlattenFolder {
        FlattenFolder::new(Arc::new(LocalFs), dir)
    }

    #[test]
    fn flatten_moves_children_up_and_undo_restores() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path();
        let d = p.join("D");
        fs::create_dir_all(d.join("sub")).unwrap();
        fs::write(d.join("x.txt"), "x").unwrap();
        fs::write(d.join("sub/deep.txt"), "deep").unwrap();

        let mut op = flatten_op(&d);
        let outcome = op.invoke();

        assert!(outcome.is_ok(), "{outcome}");
        assert!(!d.exists());
        assert_eq!(fs::read_to_string(p.join("x.txt")).unwrap(), "x");
        assert_eq!(fs::read_to_string(p.join("sub/deep.txt")).unwrap(), "deep");
        assert_eq!(op.captured_children().len(), 2);
        assert!(op.captured_children()[0].is_dir());

        let undone = op.undo();

        assert!(undone.is_ok(), "{undone}");
        assert_eq!(fs::read_to_string(d.join("x.txt")).unwrap(), "x");
        assert_eq!(fs::read_to_string(d.join("sub/deep.txt")).unwrap(), "deep");
        assert!(!p.join("x.txt").exists());
        assert!(!p.join("sub").exists());
    }

    #[test]
    fn flatten_root_fails_without_side_effects() {
        let mut op = flatten_op(Path::new("/"));
        let outcome = op.invoke();
        assert!(outcome.is_err());
        assert!(op.captured_children().is_empty());
    }

    #[test]
    fn flatten_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let mut op = flatten_op(&tmp.path().join("ghost"));
        let outcome = op.invoke();
        assert!(outcome.messages()[0].starts_with("path not found"));
    }

    #[test]
    fn child_with_folder_name_is_handled_by_renaming_first() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path();
        let d = p.join("D");
        fs::create_dir_all(d.join("D")).unwrap();
        fs::write(d.join("D/inner.txt"), "inner").unwrap();
        fs::write(d.join("y.txt"), "y").unwrap();

        let mut op = flatten_op(&d);
        let outcome = op.invoke();

        assert!(outcome.is_ok(), "{outcome}");
        // The former child now occupies P/D.
        assert_eq!(fs::read_to_string(p.join("D/inner.txt")).unwrap(), "inner");
        assert_eq!(fs::read_to_string(p.join("y.txt")).unwrap(), "y");
        assert!(!p.join("D (1)").exists());

        let undone = op.undo();

        assert!(undone.is_ok(), "{undone}");
        assert_eq!(fs::read_to_string(d.join("D/inner.txt")).unwrap(), "inner");
        assert_eq!(fs::read_to_string(d.join("y.txt")).unwrap(), "y");
        assert!(!p.join("y.txt").exists());
        assert!(!p.join("D (1)").exists());
    }

    #[test]
    fn failed_move_keeps_folder_and_undo_recovers() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path();
        let d = p.join("D");
        fs::create_dir(&d).unwrap();
        fs::write(p.join("x.txt"), "outer").unwrap();
        fs::write(d.join("x.txt"), "inner").unwrap();
        fs::write(d.join("z.txt"), "z").unwrap();

        let mut op = flatten_op(&d);
        let outcome = op.invoke();

        assert!(outcome.is_err());
        assert!(outcome.messages().iter().any(|m| m.contains("x.txt")));
        assert!(d.exists(), "folder must survive a failed move");
        assert_eq!(fs::read_to_string(p.join("z.txt")).unwrap(), "z");
        assert_eq!(fs::read_to_string(d.join("x.txt")).unwrap(), "inner");

        let undone = op.undo();

        assert!(undone.is_ok(), "{undone}");
        assert_eq!(fs::read_to_string(d.join("z.txt")).unwrap(), "z");
        assert_eq!(fs::read_to_string(d.join("x.txt")).unwrap(), "inner");
        assert_eq!(fs::read_to_string(p.join("x.txt")).unwrap(), "outer");
        assert!(!p.join("z.txt").exists());
    }

    #[test]
    fn undo_refuses_when_slot_holds_unrelated_content() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path();
        let d = p.join("D");
        fs::create_dir(&d).unwrap();
        fs::write(d.join("x.txt"), "x").unwrap();

        let mut op = flatten_op(&d);
        assert!(op.invoke().is_ok());

        fs::create_dir(&d).unwrap();
        fs::write(d.join("unrelated.txt"), "u").unwrap();

        let undone = op.undo();

        assert!(undone.is_err());
        assert!(undone.messages()[0].contains("unrelated content"));
        assert!(p.join("x.txt").exists());
        assert!(!d.join("x.txt").exists());
    }

    #[test]
    fn undo_without_invoke_is_ok() {
        let tmp = TempDir::new().unwrap();
        let mut op = flatten_op(&tmp.path().join("D"));
        assert!(op.undo().is_ok());
    }

    #[test]
    fn invoke_twice_without_undo_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let d = tmp.path().join("D");
        fs::create_dir(&d).unwrap();

        let mut op = flatten_op(&d);
        assert!(op.invoke().is_ok());
        assert!(op.invoke().is_err());
    }

    #[test]
    fn flatten_redo_after_undo() {
        let tmp = TempDir::new().unwrap();
        let d = tmp.path().join("D");
        fs::create_dir(&d).unwrap();
        fs::write(d.join("a.txt"), "a").unwrap();

        let mut op = flatten_op(&d);
        assert!(op.invoke().is_ok());
        assert!(op.undo().is_ok());
        assert!(op.invoke().is_ok());

        assert!(!d.exists());
        assert!(tmp.path().join("a.txt").exists());
    }
}
