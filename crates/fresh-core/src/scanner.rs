//! Concurrent directory walker producing a [`DiskState`].
//!
//! Every visited path is its own tokio task: query metadata, record an
//! entry, and if it is a directory, list it and spawn one task per child.
//! A shared atomic counter tracks units in flight. A unit registers its
//! children before retiring itself, so the counter can only reach zero once
//! the whole tree is done.
//!
//! Completion goes through a single-take slot. The first failure takes it
//! and reports a [`ScanError`]; branches still in flight finish quietly and
//! never produce a second result.

use crate::error::ScanError;
use crate::state::{DiskState, FileEntry};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;

type Completion = oneshot::Sender<Result<DiskState, ScanError>>;

/// Scan `root` recursively and return its sorted fingerprint.
///
/// Symlinks are followed, as with `stat`. Cycles are not detected.
///
/// # Errors
///
/// Returns the first [`ScanError`] observed. Partial results are attached
/// to the error but never returned as a state.
pub async fn scan(root: impl AsRef<Path>) -> Result<DiskState, ScanError> {
    let root = root.as_ref().to_path_buf();
    let started = Instant::now();

    let (tx, rx) = oneshot::channel();
    let walk = Arc::new(Walk {
        pending: AtomicUsize::new(0),
        failed: AtomicBool::new(false),
        entries: Mutex::new(Vec::new()),
        completion: Mutex::new(Some(tx)),
    });

    Walk::visit(&walk, root.clone());
    drop(walk);

    let result = match rx.await {
        Ok(result) => result,
        // Every unit is gone without reporting: a task panicked.
        Err(_) => Err(ScanError {
            path: root,
            source: std::io::Error::other("scan aborted before completion"),
            partial: Vec::new(),
        }),
    };

    match &result {
        Ok(state) => tracing::info!(
            "{} files scanned in {:.3}s",
            state.len(),
            started.elapsed().as_secs_f64()
        ),
        Err(err) => tracing::warn!(
            "Scan failed after {:.3}s: {}",
            started.elapsed().as_secs_f64(),
            err
        ),
    }

    result
}

struct Walk {
    /// Units spawned but not yet retired
    pending: AtomicUsize,
    /// Set once the first error has been reported; stops further fan-out
    failed: AtomicBool,
    entries: Mutex<Vec<FileEntry>>,
    /// Taken exactly once, by the first error or by the last unit
    completion: Mutex<Option<Completion>>,
}

impl Walk {
    fn visit(walk: &Arc<Self>, path: PathBuf) {
        walk.pending.fetch_add(1, Ordering::SeqCst);
        let walk = Arc::clone(walk);
        tokio::spawn(async move {
            match visit_path(&path).await {
                Ok((entry, children)) => {
                    walk.entries.lock().push(entry);
                    if !walk.failed.load(Ordering::SeqCst) {
                        for child in children {
                            Walk::visit(&walk, child);
                        }
                    }
                }
                Err((failed_path, err)) => walk.fail(failed_path, err),
            }
            walk.retire();
        });
    }

    fn fail(&self, path: PathBuf, source: std::io::Error) {
        self.failed.store(true, Ordering::SeqCst);
        let Some(tx) = self.completion.lock().take() else {
            tracing::debug!("Ignoring later scan error at {}: {}", path.display(), source);
            return;
        };
        let partial = self.entries.lock().clone();
        let _ = tx.send(Err(ScanError {
            path,
            source,
            partial,
        }));
    }

    fn retire(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) != 1 {
            return;
        }
        if let Some(tx) = self.completion.lock().take() {
            let entries = std::mem::take(&mut *self.entries.lock());
            let _ = tx.send(Ok(DiskState::from_entries(entries)));
        }
    }
}

/// Stat one path and, for directories, list its immediate children.
async fn visit_path(path: &Path) -> Result<(FileEntry, Vec<PathBuf>), (PathBuf, std::io::Error)> {
    let fail = |err| (path.to_path_buf(), err);

    let metadata = tokio::fs::metadata(path).await.map_err(fail)?;
    let modified = metadata.modified().map_err(fail)?;
    let entry = FileEntry::from_system_time(path, modified);

    let mut children = Vec::new();
    if metadata.is_dir() {
        let mut listing = tokio::fs::read_dir(path).await.map_err(fail)?;
        while let Some(child) = listing.next_entry().await.map_err(fail)? {
            children.push(child.path());
        }
    }

    Ok((entry, children))
}
