//! Recursive directory snapshots and the diff between two of them.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::CoreResult;
use crate::event::{ChangeEvent, ChangeKind};
use crate::fs::ops::FileSystem;

/// The per-path facts a diff compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EntryMeta {
    is_dir: bool,
    modified: Option<SystemTime>,
    size: u64,
}

/// Flat map of every path below a root, taken at one instant.
///
/// The root itself is not part of the snapshot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: HashMap<PathBuf, EntryMeta>,
}

impl Snapshot {
    /// Walks `root` breadth-first, listing each directory once.
    ///
    /// Hidden entries are included. Symlinked directories are recorded but
    /// not followed.
    ///
    /// # Errors
    ///
    /// Fails on the first directory that cannot be listed; no partial
    /// snapshot is returned.
    pub fn capture(fs: &dyn FileSystem, root: &Path) -> CoreResult<Self> {
        let mut entries = HashMap::new();
        let mut queue = VecDeque::from([root.to_path_buf()]);

        while let Some(dir) = queue.pop_front() {
            for entry in fs.list(&dir)? {
                if entry.is_dir() {
                    queue.push_back(entry.path().to_path_buf());
                }
                let meta = EntryMeta {
                    is_dir: entry.is_dir(),
                    modified: entry.modified(),
                    size: entry.size(),
                };
                entries.insert(entry.path().to_path_buf(), meta);
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Events that turn `self` into `newer`.
    ///
    /// Order: Created directories then files, Deleted files then directories
    /// (deepest first), Updated files, then Moved files when `detect_moves`
    /// is set. Paths are sorted within each group so the output is stable.
    /// A path whose kind flipped between file and directory is reported as
    /// deleted and created.
    pub fn diff(&self, newer: &Snapshot, detect_moves: bool) -> Vec<ChangeEvent> {
        let mut created_dirs = Vec::new();
        let mut created_files = Vec::new();
        let mut deleted_dirs = Vec::new();
        let mut deleted_files = Vec::new();
        let mut updated = Vec::new();

        for (path, meta) in &newer.entries {
            match self.entries.get(path) {
                Some(old) if old.is_dir == meta.is_dir => {
                    if !meta.is_dir && (old.size != meta.size || old.modified != meta.modified) {
                        updated.push(path);
                    }
                }
                _ if meta.is_dir => created_dirs.push(path),
                _ => created_files.push(path),
            }
        }
        for (path, meta) in &self.entries {
            let kept = newer
                .entries
                .get(path)
                .is_some_and(|new| new.is_dir == meta.is_dir);
            if kept {
                continue;
            }
            if meta.is_dir {
                deleted_dirs.push(path);
            } else {
                deleted_files.push(path);
            }
        }

        let moves = if detect_moves {
            let pairs = self.pair_moves(newer, &deleted_files, &created_files);
            deleted_files.retain(|p| !pairs.iter().any(|(from, _)| from == p));
            created_files.retain(|p| !pairs.iter().any(|(_, to)| to == p));
            pairs
        } else {
            Vec::new()
        };

        created_dirs.sort();
        created_files.sort();
        deleted_files.sort();
        deleted_dirs.sort_by(|a, b| b.cmp(a));
        updated.sort();

        let mut events = Vec::with_capacity(
            created_dirs.len()
                + created_files.len()
                + deleted_files.len()
                + deleted_dirs.len()
                + updated.len()
                + moves.len(),
        );
        events.extend(created_dirs.into_iter().map(|p| ChangeEvent::new(ChangeKind::Created, p, true)));
        events.extend(created_files.into_iter().map(|p| ChangeEvent::new(ChangeKind::Created, p, false)));
        events.extend(deleted_files.into_iter().map(|p| ChangeEvent::new(ChangeKind::Deleted, p, false)));
        events.extend(deleted_dirs.into_iter().map(|p| ChangeEvent::new(ChangeKind::Deleted, p, true)));
        events.extend(updated.into_iter().map(|p| ChangeEvent::new(ChangeKind::Updated, p, false)));
        events.extend(moves.into_iter().map(|(from, to)| ChangeEvent::moved(from, to, false)));
        events
    }

    /// Pairs deleted and created files that share size and modification
    /// time. A key that matches more than one file on either side is left
    /// unpaired.
    fn pair_moves<'a>(
        &self,
        newer: &Snapshot,
        deleted: &[&'a PathBuf],
        created: &[&'a PathBuf],
    ) -> Vec<(&'a PathBuf, &'a PathBuf)> {
        fn group<'p>(
            snapshot: &Snapshot,
            paths: &[&'p PathBuf],
        ) -> HashMap<(u64, SystemTime), Vec<&'p PathBuf>> {
            let mut groups: HashMap<_, Vec<_>> = HashMap::new();
            for path in paths {
                if let Some(EntryMeta {
                    size,
                    modified: Some(modified),
                    ..
                }) = snapshot.entries.get(*path)
                {
                    groups.entry((*size, *modified)).or_default().push(*path);
                }
            }
            groups
        }

        let gone = group(self, deleted);
        let arrived = group(newer, created);

        let mut pairs: Vec<_> = gone
            .iter()
            .filter_map(|(key, from)| match (from.as_slice(), arrived.get(key)?.as_slice()) {
                ([from], [to]) => Some((*from, *to)),
                _ => None,
            })
            .collect();
        pairs.sort();
        pairs
    }
}
