//! Raw filesystem primitives.
//!
//! The undoable operations compose these single-path primitives; they never
//! call `std::fs` directly. [`FileSystem`] is the seam, [`LocalFs`] the
//! implementation backed by the host filesystem.

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;

/// Single-path I/O primitives consumed by the core.
///
/// Create, move, copy and rename never overwrite: an occupied target is
/// reported as [`CoreError::AlreadyExists`].
pub trait FileSystem: Send + Sync {
    /// Returns `true` if anything (file, directory or link) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Lists the immediate children of `dir`, hidden entries included.
    fn list(&self, dir: &Path) -> CoreResult<Vec<FileEntry>>;

    fn create_file(&self, path: &Path) -> CoreResult<()>;
    fn create_dir(&self, path: &Path) -> CoreResult<()>;
    fn delete_file(&self, path: &Path) -> CoreResult<()>;

    /// Deletes a directory and everything below it.
    fn delete_dir(&self, path: &Path) -> CoreResult<()>;

    fn move_file(&self, src: &Path, dest: &Path) -> CoreResult<()>;
    fn move_dir(&self, src: &Path, dest: &Path) -> CoreResult<()>;
    fn copy_file(&self, src: &Path, dest: &Path) -> CoreResult<()>;

    /// Copies a directory tree. Symlinks are copied as links.
    fn copy_dir(&self, src: &Path, dest: &Path) -> CoreResult<()>;

    /// Renames `path` in place to `new_name`.
    fn rename(&self, path: &Path, new_name: &str) -> CoreResult<()>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

/// Maximum recursion depth for directory copies to prevent symlink loops.
const MAX_COPY_DEPTH: usize = 64;

fn map_io(path: &Path, e: std::io::Error) -> CoreError {
    match e.kind() {
        std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
        std::io::ErrorKind::AlreadyExists => CoreError::AlreadyExists(path.to_path_buf()),
        _ => CoreError::Io(e),
    }
}

fn require_source(src: &Path) -> CoreResult<std::fs::Metadata> {
    // symlink_metadata does not follow links and avoids a separate exists() race
    std::fs::symlink_metadata(src).map_err(|e| map_io(src, e))
}

fn require_vacant(dest: &Path) -> CoreResult<()> {
    if std::fs::symlink_metadata(dest).is_ok() {
        return Err(CoreError::AlreadyExists(dest.to_path_buf()));
    }
    Ok(())
}

fn copy_link_or_file(src: &Path, dest: &Path, meta: &std::fs::Metadata) -> CoreResult<()> {
    if meta.is_symlink() {
        let link_target = std::fs::read_link(src)?;
        #[cfg(unix)]
        std::os::unix::fs::symlink(&link_target, dest)?;
        #[cfg(not(unix))]
        {
            let _ = link_target;
            std::fs::copy(src, dest)?;
        }
    } else {
        std::fs::copy(src, dest).map_err(|e| map_io(src, e))?;
    }
    Ok(())
}

fn copy_dir_recursive(src: &Path, dest: &Path, depth: usize) -> CoreResult<()> {
    if depth > MAX_COPY_DEPTH {
        return Err(CoreError::Io(std::io::Error::other(format!(
            "maximum recursion depth ({MAX_COPY_DEPTH}) exceeded during copy"
        ))));
    }

    std::fs::create_dir(dest).map_err(|e| map_io(dest, e))?;

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let entry_path = entry.path();
        let target = dest.join(entry.file_name());

        // file_type() does not follow symlinks
        let ft = entry.file_type()?;
        if ft.is_dir() {
            copy_dir_recursive(&entry_path, &target, depth + 1)?;
        } else {
            let meta = std::fs::symlink_metadata(&entry_path)?;
            copy_link_or_file(&entry_path, &target, &meta)?;
        }
    }

    Ok(())
}

/// Moves between filesystems as copy then delete.
///
/// A failed copy leaves no partial target behind. If the source cannot be
/// deleted, whatever the delete already removed is put back from the copy and
/// the copy is dropped, so a failed move leaves the source whole and the
/// destination vacant.
fn move_across_devices(
    src: &Path,
    dest: &Path,
    copy: impl FnOnce() -> CoreResult<()>,
    remove_source: impl FnOnce() -> std::io::Result<()>,
) -> CoreResult<()> {
    if let Err(e) = copy() {
        discard_copy(dest);
        return Err(e);
    }
    if let Err(e) = remove_source() {
        match restore_from_copy(dest, src) {
            Ok(()) => discard_copy(dest),
            Err(restore) => tracing::warn!(
                "could not restore {} from {}, keeping the copy: {restore}",
                src.display(),
                dest.display()
            ),
        }
        return Err(map_io(src, e));
    }
    Ok(())
}

/// Copies back every entry of `copy` that is missing under `original`.
fn restore_from_copy(copy: &Path, original: &Path) -> CoreResult<()> {
    let meta = std::fs::symlink_metadata(copy)?;
    if !meta.is_dir() {
        if std::fs::symlink_metadata(original).is_err() {
            copy_link_or_file(copy, original, &meta)?;
        }
        return Ok(());
    }
    if std::fs::symlink_metadata(original).is_err() {
        std::fs::create_dir(original).map_err(|e| map_io(original, e))?;
    }
    for entry in std::fs::read_dir(copy)? {
        let entry = entry?;
        restore_from_copy(&entry.path(), &original.join(entry.file_name()))?;
    }
    Ok(())
}

fn discard_copy(dest: &Path) {
    let removed = match std::fs::symlink_metadata(dest) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(dest),
        Ok(_) => std::fs::remove_file(dest),
        Err(_) => return,
    };
    if let Err(e) = removed {
        tracing::warn!("could not remove {} after failed move: {e}", dest.display());
    }
}

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path)
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    fn list(&self, dir: &Path) -> CoreResult<Vec<FileEntry>> {
        let meta = require_source(dir)?;
        if !meta.is_dir() {
            return Err(CoreError::NotADirectory(dir.to_path_buf()));
        }

        let mut entries = Vec::new();
        for dir_entry in std::fs::read_dir(dir).map_err(|e| map_io(dir, e))? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            // An entry can vanish between read_dir and the metadata call.
            let metadata = match std::fs::symlink_metadata(&path) {
                Ok(m) => m,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(map_io(&path, e)),
            };
            entries.push(FileEntry::new(path, &metadata));
        }

        Ok(entries)
    }

    fn create_file(&self, path: &Path) -> CoreResult<()> {
        std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| map_io(path, e))?;
        Ok(())
    }

    fn create_dir(&self, path: &Path) -> CoreResult<()> {
        std::fs::create_dir(path).map_err(|e| map_io(path, e))
    }

    fn delete_file(&self, path: &Path) -> CoreResult<()> {
        let meta = require_source(path)?;
        if meta.is_dir() {
            return Err(CoreError::Io(std::io::Error::other(format!(
                "expected a file, found a directory: {}",
                path.display()
            ))));
        }
        // Handles both regular files and symlinks
        std::fs::remove_file(path).map_err(|e| map_io(path, e))
    }

    fn delete_dir(&self, path: &Path) -> CoreResult<()> {
        let meta = require_source(path)?;
        if !meta.is_dir() {
            return Err(CoreError::NotADirectory(path.to_path_buf()));
        }
        std::fs::remove_dir_all(path).map_err(|e| map_io(path, e))
    }

    fn move_file(&self, src: &Path, dest: &Path) -> CoreResult<()> {
        let meta = require_source(src)?;
        require_vacant(dest)?;
        match std::fs::rename(src, dest) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => move_across_devices(
                src,
                dest,
                || copy_link_or_file(src, dest, &meta),
                || std::fs::remove_file(src),
            ),
            Err(e) => Err(map_io(dest, e)),
        }
    }

    fn move_dir(&self, src: &Path, dest: &Path) -> CoreResult<()> {
        let meta = require_source(src)?;
        if !meta.is_dir() {
            return Err(CoreError::NotADirectory(src.to_path_buf()));
        }
        require_vacant(dest)?;
        if dest.starts_with(src) {
            return Err(CoreError::InvalidName(format!(
                "cannot move {} into itself",
                src.display()
            )));
        }
        match std::fs::rename(src, dest) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => move_across_devices(
                src,
                dest,
                || copy_dir_recursive(src, dest, 0),
                || std::fs::remove_dir_all(src),
            ),
            Err(e) => Err(map_io(dest, e)),
        }
    }

    fn copy_file(&self, src: &Path, dest: &Path) -> CoreResult<()> {
        let meta = require_source(src)?;
        require_vacant(dest)?;
        copy_link_or_file(src, dest, &meta)
    }

    fn copy_dir(&self, src: &Path, dest: &Path) -> CoreResult<()> {
        let meta = require_source(src)?;
        if !meta.is_dir() {
            return Err(CoreError::NotADirectory(src.to_path_buf()));
        }
        require_vacant(dest)?;
        if dest.starts_with(src) {
            return Err(CoreError::InvalidName(format!(
                "cannot copy {} into itself",
                src.display()
            )));
        }
        copy_dir_recursive(src, dest, 0)
    }

    fn rename(&self, path: &Path, new_name: &str) -> CoreResult<()> {
        require_source(path)?;
        crate::naming::validate_name(new_name)?;

        let parent = path
            .parent()
            .ok_or_else(|| CoreError::TopLevelDirectory(path.to_path_buf()))?;
        let new_path = parent.join(new_name);

        // A case-only rename on a case-insensitive filesystem sees its own
        // source as the "existing" target.
        let same_entry = path
            .file_name()
            .map(|n| crate::fs::entry::names_equal(&n.to_string_lossy(), new_name))
            .unwrap_or(false);
        if !same_entry {
            require_vacant(&new_path)?;
        }

        std::fs::rename(path, &new_path).map_err(|e| map_io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn list_returns_entries_with_metadata() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file1.txt"), "hello").unwrap();
        fs::write(tmp.path().join(".hidden"), "").unwrap();
        fs::create_dir(tmp.path().join("subdir")).unwrap();

        let entries = LocalFs.list(tmp.path()).unwrap();

        assert_eq!(entries.len(), 3);
        let file = entries.iter().find(|e| e.name() == "file1.txt").unwrap();
        assert_eq!(file.size(), 5);
        assert!(entries.iter().any(|e| e.name() == ".hidden" && e.is_hidden()));
        assert!(entries.iter().any(|e| e.name() == "subdir" && e.is_dir()));
    }

    #[test]
    fn list_nonexistent_returns_not_found() {
        let result = LocalFs.list(Path::new("/nonexistent/path/that/does/not/exist"));
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[test]
    fn list_on_file_returns_not_a_directory() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("not_a_dir.txt");
        fs::write(&file_path, "content").unwrap();

        let result = LocalFs.list(&file_path);
        assert!(matches!(result, Err(CoreError::NotADirectory(_))));
    }

    #[test]
    fn create_file_refuses_existing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("new.txt");
        LocalFs.create_file(&path).unwrap();
        assert!(path.is_file());

        let again = LocalFs.create_file(&path);
        assert!(matches!(again, Err(CoreError::AlreadyExists(_))));
    }

    #[test]
    fn move_file_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.txt");
        let dest = tmp.path().join("b.txt");
        fs::write(&src, "a").unwrap();
        fs::write(&dest, "b").unwrap();

        let result = LocalFs.move_file(&src, &dest);
        assert!(matches!(result, Err(CoreError::AlreadyExists(_))));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "b");
        assert!(src.exists());
    }

    #[test]
    fn move_dir_moves_contents() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("nested/f.txt"), "x").unwrap();
        let dest = tmp.path().join("dest");

        LocalFs.move_dir(&src, &dest).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(dest.join("nested/f.txt")).unwrap(), "x");
    }

    #[test]
    fn move_file_into_missing_directory_keeps_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.txt");
        fs::write(&src, "a").unwrap();
        let dest = tmp.path().join("missing/a.txt");

        let result = LocalFs.move_file(&src, &dest);
        assert!(matches!(result, Err(CoreError::NotFound(_))));
        assert!(src.exists());
        assert!(!tmp.path().join("missing").exists());
    }

    #[test]
    fn cross_device_file_move_drops_copy_when_source_cannot_be_deleted() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.txt");
        let dest = tmp.path().join("other/a.txt");
        fs::write(&src, "a").unwrap();
        fs::create_dir(tmp.path().join("other")).unwrap();
        let meta = fs::symlink_metadata(&src).unwrap();

        let result = move_across_devices(
            &src,
            &dest,
            || copy_link_or_file(&src, &dest, &meta),
            || Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied)),
        );

        assert!(matches!(result, Err(CoreError::PermissionDenied(p)) if p == src));
        assert_eq!(fs::read_to_string(&src).unwrap(), "a");
        assert!(!dest.exists());
    }

    #[test]
    fn cross_device_dir_move_restores_partly_deleted_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("nested/f.txt"), "f").unwrap();
        fs::write(src.join("top.txt"), "top").unwrap();
        let dest = tmp.path().join("dest");

        let result = move_across_devices(
            &src,
            &dest,
            || copy_dir_recursive(&src, &dest, 0),
            || {
                fs::remove_dir_all(src.join("nested"))?;
                Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
            },
        );

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(src.join("nested/f.txt")).unwrap(), "f");
        assert_eq!(fs::read_to_string(src.join("top.txt")).unwrap(), "top");
        assert!(!dest.exists());
    }

    #[test]
    fn cross_device_move_removes_partial_copy() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir(&src).unwrap();
        let dest = tmp.path().join("dest");

        let result = move_across_devices(
            &src,
            &dest,
            || {
                fs::create_dir(&dest)?;
                fs::write(dest.join("half.txt"), "")?;
                Err(CoreError::Io(std::io::Error::other("disk full")))
            },
            || unreachable!("source is kept when the copy fails"),
        );

        assert!(result.is_err());
        assert!(src.exists());
        assert!(!dest.exists());
    }

    #[test]
    fn move_dir_into_itself_fails() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir(&src).unwrap();

        let result = LocalFs.move_dir(&src, &src.join("inner"));
        assert!(result.is_err());
        assert!(src.exists());
    }

    #[test]
    fn copy_dir_copies_recursively() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("a/b")).unwrap();
        fs::write(src.join("a/b/deep.txt"), "deep").unwrap();
        fs::write(src.join("top.txt"), "top").unwrap();
        let dest = tmp.path().join("copy");

        LocalFs.copy_dir(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a/b/deep.txt")).unwrap(), "deep");
        assert_eq!(fs::read_to_string(dest.join("top.txt")).unwrap(), "top");
        assert!(src.join("top.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn copy_dir_preserves_symlinks() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("real.txt"), "data").unwrap();
        std::os::unix::fs::symlink(src.join("real.txt"), src.join("link.txt")).unwrap();

        let dest = tmp.path().join("dest");
        LocalFs.copy_dir(&src, &dest).unwrap();

        let meta = fs::symlink_metadata(dest.join("link.txt")).unwrap();
        assert!(meta.is_symlink());
    }

    #[test]
    fn delete_dir_removes_tree() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("doomed");
        fs::create_dir_all(dir.join("inner")).unwrap();
        fs::write(dir.join("inner/f"), "").unwrap();

        LocalFs.delete_dir(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn delete_file_missing_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = LocalFs.delete_file(&tmp.path().join("ghost"));
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[test]
    fn rename_changes_name_in_place() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("old.txt");
        fs::write(&path, "content").unwrap();

        LocalFs.rename(&path, "new.txt").unwrap();

        assert!(!path.exists());
        assert_eq!(
            fs::read_to_string(tmp.path().join("new.txt")).unwrap(),
            "content"
        );
    }

    #[test]
    fn rename_rejects_invalid_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.txt");
        fs::write(&path, "").unwrap();

        let result = LocalFs.rename(&path, "a/b");
        assert!(matches!(result, Err(CoreError::InvalidName(_))));
        assert!(path.exists());
    }

    #[test]
    fn rename_refuses_existing_target() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        fs::write(&path, "a").unwrap();
        fs::write(tmp.path().join("b.txt"), "b").unwrap();

        let result = LocalFs.rename(&path, "b.txt");
        assert!(matches!(result, Err(CoreError::AlreadyExists(_))));
    }
}
