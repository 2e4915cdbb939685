//! Fresh core - rebuild-on-change engine for the Fresh dev server.
//!
//! Before each response the server asks this crate one question: is the
//! tree built for what is on disk right now? Answering it takes four
//! pieces:
//!
//! - [`lock`] - FIFO gate so only one rebuild check runs at a time
//! - [`scanner`] - concurrent walk producing a sorted mtime fingerprint
//! - [`state`] - the fingerprint types and their equality
//! - [`runner`] - runs the external build command and captures its output
//!
//! [`coordinator`] ties them together behind
//! [`RebuildCoordinator::rebuild_if_necessary`].
//!
//! The crate emits `tracing` events and never installs a subscriber;
//! binaries choose how to render them.
//!
//! # Example
//!
//! ```rust,no_run
//! use fresh_core::{BuildRunner, RebuildCoordinator};
//! use std::sync::Arc;
//!
//! # async fn demo() -> fresh_core::Result<()> {
//! let runner = BuildRunner::new(Some("make site".to_string()));
//! let coordinator = Arc::new(RebuildCoordinator::new("public", runner));
//!
//! coordinator.rebuild_if_necessary().await?;
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod error;
pub mod lock;
pub mod runner;
pub mod scanner;
pub mod state;

pub use coordinator::{RebuildCoordinator, RebuildStatus};
pub use error::{BuildFailure, RebuildError, Result, ScanError};
pub use lock::{AsyncLock, LockGuard};
pub use runner::{BuildOutcome, BuildReport, BuildRunner};
pub use scanner::scan;
pub use state::{equals, DiskState, FileEntry};
