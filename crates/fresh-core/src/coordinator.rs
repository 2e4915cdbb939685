//! Rebuild coordination: scan, compare, build, rescan, cache.
//!
//! One [`RebuildCoordinator`] exists per served tree. It owns the baseline
//! (the last state confirmed to be in sync with a build) and the FIFO lock
//! that serializes rebuild checks. Each call to
//! [`rebuild_if_necessary`](RebuildCoordinator::rebuild_if_necessary) walks
//! this state machine while holding the lock:
//!
//! 1. **Scanning** - scan the root; on error, stop with [`RebuildError::Scan`].
//! 2. **Comparing** - equal to the baseline means up to date; stop.
//! 3. **Building** - run the build; on failure stop with
//!    [`RebuildError::Build`] and keep the old baseline, so the next check
//!    retries against it.
//! 4. **Resyncing** - rescan; on error stop with [`RebuildError::Rescan`]
//!    and keep the old baseline. On success the new state replaces it.
//!
//! The lock is released on every path before the result is returned.
//!
//! Each check runs on its own tokio task. A caller that stops waiting (an
//! HTTP client that disconnects mid-build) does not cancel it: the build
//! runs to completion and the baseline is updated for the next caller.
//!
//! A rescan failure leaves the baseline stale, so the next check rebuilds
//! again even if nothing changed since the successful build. There is no
//! forced retry beyond that.

use crate::error::{RebuildError, Result};
use crate::lock::{AsyncLock, LockGuard};
use crate::runner::{BuildReport, BuildRunner};
use crate::scanner::scan;
use crate::state::{equals, DiskState};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a successful rebuild check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildStatus {
    /// The tree matched the baseline; nothing ran
    UpToDate,
    /// The tree changed; the build ran and the baseline was refreshed
    Rebuilt(BuildReport),
}

impl RebuildStatus {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, RebuildStatus::UpToDate)
    }

    pub fn is_rebuilt(&self) -> bool {
        matches!(self, RebuildStatus::Rebuilt(_))
    }
}

/// Serializes rebuild checks for one root and owns its baseline.
///
/// Share it as `Arc<RebuildCoordinator>`; all methods take `&self`.
#[derive(Debug)]
pub struct RebuildCoordinator {
    root: PathBuf,
    runner: BuildRunner,
    lock: AsyncLock,
    /// Written only while `lock` is held
    baseline: Mutex<DiskState>,
}

impl RebuildCoordinator {
    /// Create a coordinator with an empty baseline.
    ///
    /// The first check therefore always builds (unless the tree scans as
    /// empty, which cannot happen for an existing root).
    pub fn new(root: impl Into<PathBuf>, runner: BuildRunner) -> Self {
        Self {
            root: root.into(),
            runner,
            lock: AsyncLock::new(),
            baseline: Mutex::new(DiskState::empty()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runner(&self) -> &BuildRunner {
        &self.runner
    }

    /// Snapshot of the current baseline.
    pub fn baseline(&self) -> DiskState {
        self.baseline.lock().clone()
    }

    /// Whether a rebuild check is in flight.
    pub fn is_busy(&self) -> bool {
        self.lock.is_locked()
    }

    /// Number of callers queued behind the in-flight check.
    pub fn queued(&self) -> usize {
        self.lock.waiting()
    }

    /// Make sure the tree is built for its current contents.
    ///
    /// Concurrent callers are served one at a time in arrival order; a
    /// caller queued behind a build usually finds the tree up to date.
    ///
    /// Dropping the returned future does not cancel the check.
    ///
    /// # Errors
    ///
    /// - [`RebuildError::Scan`] if the initial scan fails
    /// - [`RebuildError::Build`] if the build command fails
    /// - [`RebuildError::Rescan`] if the post-build scan fails
    /// - [`RebuildError::Interrupted`] if the runtime shut down mid-check
    pub async fn rebuild_if_necessary(self: &Arc<Self>) -> Result<RebuildStatus> {
        let coordinator = Arc::clone(self);
        let task = tokio::spawn(async move {
            let guard = coordinator.lock.acquire().await;
            let result = coordinator.check(&guard).await;
            guard.release();
            result
        });

        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(RebuildError::Interrupted),
        }
    }

    /// One pass of the state machine. The guard proves the lock is held.
    async fn check(&self, _held: &LockGuard<'_>) -> Result<RebuildStatus> {
        tracing::debug!("Scanning {}", self.root.display());
        let current = scan(&self.root).await.map_err(RebuildError::Scan)?;

        let unchanged = equals(&current, &self.baseline.lock());
        if unchanged {
            tracing::debug!("{} is up to date", self.root.display());
            return Ok(RebuildStatus::UpToDate);
        }

        tracing::debug!("{} changed, rebuilding", self.root.display());
        let report = self.runner.run().await?;

        tracing::debug!("Rescanning {} after build", self.root.display());
        let rebuilt = scan(&self.root).await.map_err(RebuildError::Rescan)?;
        *self.baseline.lock() = rebuilt;

        Ok(RebuildStatus::Rebuilt(report))
    }
}
