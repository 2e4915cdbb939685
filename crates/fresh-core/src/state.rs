//! Disk-state fingerprints and their comparison.
//!
//! A [`DiskState`] is the sorted list of every node visited by a scan, each
//! with its modification time. Two states are equal iff they have the same
//! length and, position by position, the same path and mtime.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// One filesystem node (file or directory) as seen at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileEntry {
    /// Path as produced by the scan (root joined with the relative path).
    pub path: PathBuf,
    /// Modification time in milliseconds since the Unix epoch. Negative
    /// for times before the epoch.
    pub modified_at_millis: i64,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, modified_at_millis: i64) -> Self {
        Self {
            path: path.into(),
            modified_at_millis,
        }
    }

    /// Build an entry from a path and a metadata timestamp.
    pub fn from_system_time(path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        Self::new(path, system_time_to_millis(modified))
    }
}

/// Convert a timestamp to signed epoch milliseconds.
pub fn system_time_to_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_millis())
            .map(|ms| -ms)
            .unwrap_or(i64::MIN),
    }
}

/// Sort key: raw path bytes, independent of locale and of component
/// splitting (`a/b` vs `a.b` orders by the `/` and `.` bytes).
fn path_key(path: &Path) -> &[u8] {
    path.as_os_str().as_encoded_bytes()
}

/// Fingerprint of a directory tree, sorted ascending by path bytes.
///
/// The sort is established on construction; there is no way to build an
/// unsorted state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskState {
    entries: Vec<FileEntry>,
}

impl DiskState {
    /// The empty state. This is the coordinator's initial baseline.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sort `entries` by path and wrap them.
    pub fn from_entries(mut entries: Vec<FileEntry>) -> Self {
        entries.sort_by(|a, b| path_key(&a.path).cmp(path_key(&b.path)));
        Self { entries }
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<FileEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a DiskState {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Structural equality of two fingerprints.
///
/// Compares lengths, then `path` and `modified_at_millis` at each sorted
/// position. Paths are not normalized.
pub fn equals(a: &DiskState, b: &DiskState) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|(left, right)| {
            left.path == right.path && left.modified_at_millis == right.modified_at_millis
        })
}
