//! File entry representation.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use unicode_normalization::UnicodeNormalization;

use crate::error::{CoreError, CoreResult};

/// The two variants a [`FileEntry`] can take.
///
/// Operations branch once per entry on this tag to pick the file or
/// directory flavour of a raw I/O primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// A single file or directory entry referenced by absolute path.
///
/// `FileEntry` is immutable: renaming produces a new entry via
/// [`FileEntry::with_path`] rather than mutating this one. Directory sizes
/// are reported as `0`.
///
/// # Examples
///
/// ```
/// use tidefm_core::FileEntry;
///
/// let entry = FileEntry::file("/home/user/report.final.pdf");
/// assert_eq!(entry.name(), "report.final.pdf");
/// assert_eq!(entry.stem(), "report.final");
/// assert_eq!(entry.extension(), ".pdf");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: PathBuf,
    name: String,
    kind: EntryKind,
    size: u64,
    modified: Option<SystemTime>,
    is_hidden: bool,
}

impl FileEntry {
    /// Creates a new `FileEntry` from a path and its metadata.
    ///
    /// Symlinks are treated as files so that operations act on the link
    /// itself. Hidden files are detected by a leading `.` in the file name.
    pub fn new(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let mut entry = Self::with_kind(path, kind);
        if kind == EntryKind::File {
            entry.size = metadata.len();
        }
        entry.modified = metadata.modified().ok();
        entry
    }

    /// Creates a file entry without touching the filesystem.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::with_kind(path.into(), EntryKind::File)
    }

    /// Creates a directory entry without touching the filesystem.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::with_kind(path.into(), EntryKind::Directory)
    }

    /// Reads the metadata of `path` (without following symlinks) and
    /// builds the matching entry.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if nothing exists at `path`.
    /// - [`CoreError::Io`] for any other metadata failure.
    pub fn from_path(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let metadata = std::fs::symlink_metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::NotFound(path.clone())
            } else {
                CoreError::Io(e)
            }
        })?;
        Ok(Self::new(path, &metadata))
    }

    fn with_kind(path: PathBuf, kind: EntryKind) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let is_hidden = name.starts_with('.');
        Self {
            path,
            name,
            kind,
            size: 0,
            modified: None,
            is_hidden,
        }
    }

    /// Returns a new entry of the same kind located at `path`.
    pub fn with_path(&self, path: impl Into<PathBuf>) -> Self {
        let mut entry = Self::with_kind(path.into(), self.kind);
        entry.size = self.size;
        entry.modified = self.modified;
        entry
    }

    /// Returns the full path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the directory containing this entry, if any.
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Returns the file or directory name (last component of the path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name normalised to NFC for display.
    ///
    /// macOS stores filenames decomposed; the raw [`FileEntry::name`] must
    /// still be used when building paths.
    pub fn display_name(&self) -> String {
        self.name.nfc().collect()
    }

    /// Returns the name without its extension.
    pub fn stem(&self) -> &str {
        split_name(&self.name, self.kind).0
    }

    /// Returns the extension including its leading dot, or `""` for
    /// directories and extensionless files.
    pub fn extension(&self) -> &str {
        split_name(&self.name, self.kind).1
    }

    /// Returns the variant tag of this entry.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns `true` if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Returns the file size in bytes. Always `0` for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the last-modified time, if available.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Returns `true` if the name starts with `.`.
    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }
}

/// Splits a name into stem and extension (extension keeps its dot).
///
/// A leading dot does not start an extension (`.bashrc`), and a trailing
/// dot yields no extension.
pub(crate) fn split_name(name: &str, kind: EntryKind) -> (&str, &str) {
    if kind == EntryKind::Directory {
        return (name, "");
    }
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Compares two names the way the host filesystem does.
///
/// Case-insensitive on Windows and macOS, case-sensitive elsewhere.
pub fn names_equal(a: &str, b: &str) -> bool {
    #[cfg(any(windows, target_os = "macos"))]
    {
        a.to_lowercase() == b.to_lowercase()
    }
    #[cfg(not(any(windows, target_os = "macos")))]
    {
        a == b
    }
}

/// Compares two paths component-wise with [`names_equal`].
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    let mut left = a.components();
    let mut right = b.components();
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(l), Some(r)) => {
                if !names_equal(&l.as_os_str().to_string_lossy(), &r.as_os_str().to_string_lossy())
                {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn file_entry_from_regular_file() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("test.txt");
        fs::write(&file_path, "hello").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = FileEntry::new(file_path.clone(), &metadata);

        assert_eq!(entry.name(), "test.txt");
        assert_eq!(entry.stem(), "test");
        assert_eq!(entry.extension(), ".txt");
        assert_eq!(entry.size(), 5);
        assert_eq!(entry.kind(), EntryKind::File);
        assert!(!entry.is_hidden());
        assert_eq!(entry.path(), file_path);
        assert!(entry.modified().is_some());
    }

    #[test]
    fn file_entry_from_directory() {
        let tmp = TempDir::new().unwrap();
        let dir_path = tmp.path().join("photos.2024");
        fs::create_dir(&dir_path).unwrap();
        fs::write(dir_path.join("a.jpg"), "data").unwrap();

        let entry = FileEntry::from_path(&dir_path).unwrap();

        assert!(entry.is_dir());
        assert_eq!(entry.size(), 0);
        assert_eq!(entry.stem(), "photos.2024");
        assert_eq!(entry.extension(), "");
    }

    #[test]
    fn from_path_missing_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = FileEntry::from_path(tmp.path().join("nope"));
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_directory_is_a_file_entry() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        fs::create_dir(&target).unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let entry = FileEntry::from_path(&link).unwrap();
        assert_eq!(entry.kind(), EntryKind::File);
    }

    #[test]
    fn hidden_file_has_no_extension() {
        let entry = FileEntry::file("/home/user/.bashrc");
        assert!(entry.is_hidden());
        assert_eq!(entry.stem(), ".bashrc");
        assert_eq!(entry.extension(), "");
    }

    #[test]
    fn multi_dot_name_splits_at_last_dot() {
        let entry = FileEntry::file("/data/archive.tar.gz");
        assert_eq!(entry.stem(), "archive.tar");
        assert_eq!(entry.extension(), ".gz");
    }

    #[test]
    fn trailing_dot_yields_no_extension() {
        let entry = FileEntry::file("/data/odd.");
        assert_eq!(entry.stem(), "odd.");
        assert_eq!(entry.extension(), "");
    }

    #[test]
    fn with_path_produces_new_entry_of_same_kind() {
        let entry = FileEntry::directory("/a/old");
        let renamed = entry.with_path("/a/new");
        assert_eq!(renamed.name(), "new");
        assert!(renamed.is_dir());
        assert_eq!(entry.name(), "old");
    }

    #[test]
    fn display_name_is_nfc() {
        let decomposed = "e\u{301}.txt";
        let entry = FileEntry::file(format!("/tmp/{decomposed}"));
        assert_eq!(entry.display_name(), "\u{e9}.txt");
        assert_eq!(entry.name(), decomposed);
    }

    #[test]
    fn names_equal_matches_identical_names() {
        assert!(names_equal("Report.txt", "Report.txt"));
        assert!(!names_equal("a.txt", "b.txt"));
    }

    #[cfg(not(any(windows, target_os = "macos")))]
    #[test]
    fn names_equal_is_case_sensitive_on_linux() {
        assert!(!names_equal("Report.txt", "report.txt"));
    }

    #[test]
    fn paths_equal_compares_components() {
        assert!(paths_equal(Path::new("/a/b"), Path::new("/a/b")));
        assert!(!paths_equal(Path::new("/a/b"), Path::new("/a/b/c")));
    }
}
