//! Collision-free name generation and name validation.
//!
//! All functions probe the filesystem at call time; the returned names are
//! free at that moment only. Candidates follow the `"{stem} ({n}){ext}"`
//! shape with `n` counting up from 1.

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::{split_name, EntryKind, FileEntry};
use crate::fs::ops::FileSystem;

fn numbered(stem: &str, n: u64, ext: &str) -> String {
    format!("{stem} ({n}){ext}")
}

fn free_in_all(fs: &dyn FileSystem, dirs: &[&Path], name: &str) -> bool {
    dirs.iter().all(|dir| !fs.exists(&dir.join(name)))
}

/// Probes `"{stem} ({n}){ext}"` from `start` upward and returns the first
/// candidate free in every directory, together with the index used.
fn probe(fs: &dyn FileSystem, dirs: &[&Path], stem: &str, ext: &str, start: u64) -> (String, u64) {
    let mut n = start;
    loop {
        let candidate = numbered(stem, n, ext);
        if free_in_all(fs, dirs, &candidate) {
            return (candidate, n);
        }
        n += 1;
    }
}

/// Returns `desired` if it is free in `dir`, otherwise the first free
/// `"{stem} ({n}){ext}"` candidate. The name is split as a file name.
pub fn available_name(fs: &dyn FileSystem, dir: &Path, desired: &str) -> String {
    available_name_of_kind(fs, dir, desired, EntryKind::File)
}

/// Like [`available_name`], but directories never have their name split
/// into stem and extension.
pub fn available_name_of_kind(
    fs: &dyn FileSystem,
    dir: &Path,
    desired: &str,
    kind: EntryKind,
) -> String {
    available_name_in_all(fs, desired, kind, &[dir])
}

/// Returns a name that is free in **every** directory of `dirs` at once.
///
/// Used when one name must be valid in two locations simultaneously.
pub fn available_name_in_all(
    fs: &dyn FileSystem,
    desired: &str,
    kind: EntryKind,
    dirs: &[&Path],
) -> String {
    if free_in_all(fs, dirs, desired) {
        return desired.to_string();
    }
    let (stem, ext) = split_name(desired, kind);
    probe(fs, dirs, stem, ext, 1).0
}

/// Returns a free `"{stem} - Copy{ext}"` name for duplicating `entry` in `dir`.
pub fn copy_name(fs: &dyn FileSystem, dir: &Path, entry: &FileEntry) -> String {
    let desired = format!("{} - Copy{}", entry.stem(), entry.extension());
    available_name_of_kind(fs, dir, &desired, entry.kind())
}

/// Generates one name per entry for renaming a batch to a shared pattern.
///
/// Each entry keeps its own extension. The numeric index is a cursor that
/// only moves forward across the batch, so the names are pairwise distinct
/// without re-reading the directory after each assignment. The result is
/// index-aligned with `entries`.
pub fn available_names(
    fs: &dyn FileSystem,
    dir: &Path,
    entries: &[FileEntry],
    pattern: &str,
) -> Vec<String> {
    let mut cursor = 1;
    entries
        .iter()
        .map(|entry| {
            let (name, used) = probe(fs, &[dir], pattern, entry.extension(), cursor);
            cursor = used + 1;
            name
        })
        .collect()
}

/// Checks that `name` can be used as a single path component.
///
/// # Errors
///
/// Returns [`CoreError::InvalidName`] for empty or whitespace-only names,
/// `.` and `..`, names containing `/` or NUL, and on Windows names with
/// reserved characters or control characters.
pub fn validate_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::InvalidName("name is empty".to_string()));
    }
    if name == "." || name == ".." {
        return Err(CoreError::InvalidName(name.to_string()));
    }
    if name.contains('/') || name.contains('\0') {
        return Err(CoreError::InvalidName(name.to_string()));
    }
    #[cfg(windows)]
    if name
        .chars()
        .any(|c| matches!(c, '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control())
    {
        return Err(CoreError::InvalidName(name.to_string()));
    }
    Ok(())
}
