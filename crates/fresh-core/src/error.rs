//! Error types for the rebuild engine.
//!
//! - [`ScanError`] - a metadata query or directory listing failed mid-walk
//! - [`BuildFailure`] - the build command could not run or exited badly
//! - [`RebuildError`] - what [`rebuild_if_necessary`] hands back to callers
//!
//! [`rebuild_if_necessary`]: crate::RebuildCoordinator::rebuild_if_necessary

use crate::state::FileEntry;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// A filesystem operation failed while walking the tree.
///
/// `partial` holds whatever had been collected when the first failure was
/// observed. It is diagnostic only and must never be used as a baseline.
#[derive(Debug, Error)]
#[error("Failed to scan {}: {source}", .path.display())]
pub struct ScanError {
    /// Path whose metadata query or listing failed
    pub path: PathBuf,
    /// Underlying OS error
    #[source]
    pub source: std::io::Error,
    /// Entries recorded before the failure, unsorted
    pub partial: Vec<FileEntry>,
}

impl ScanError {
    pub fn kind(&self) -> std::io::ErrorKind {
        self.source.kind()
    }
}

/// The build command did not succeed.
///
/// Every variant carries the combined stdout/stderr captured so far.
#[derive(Debug, Error)]
pub enum BuildFailure {
    /// The shell could not be started
    #[error("Failed to start build command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
        output: String,
    },

    /// Reading output or waiting on the process failed
    #[error("Build command `{command}` failed while running: {source}\n{output}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
        output: String,
    },

    /// Non-zero exit code or terminated by a signal
    #[error("Build command `{command}` failed ({status})\n{output}")]
    Exited {
        command: String,
        status: ExitStatus,
        output: String,
    },

    /// Killed after exceeding the configured timeout
    #[error("Build command `{command}` timed out after {}s\n{output}", .after.as_secs_f64())]
    TimedOut {
        command: String,
        after: Duration,
        output: String,
    },
}

impl BuildFailure {
    /// Combined process output captured before the failure.
    pub fn output(&self) -> &str {
        match self {
            BuildFailure::Spawn { output, .. }
            | BuildFailure::Io { output, .. }
            | BuildFailure::Exited { output, .. }
            | BuildFailure::TimedOut { output, .. } => output,
        }
    }

    pub fn command(&self) -> &str {
        match self {
            BuildFailure::Spawn { command, .. }
            | BuildFailure::Io { command, .. }
            | BuildFailure::Exited { command, .. }
            | BuildFailure::TimedOut { command, .. } => command,
        }
    }

    /// Exit code, if the process exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildFailure::Exited { status, .. } => status.code(),
            _ => None,
        }
    }
}

/// Why a rebuild check did not complete.
#[derive(Debug, Error)]
pub enum RebuildError {
    /// Scanning before the comparison failed; nothing was built
    #[error("Scan error: {0}")]
    Scan(#[source] ScanError),

    /// The build ran and failed; the baseline was left as it was
    #[error("Build error: {0}")]
    Build(#[from] BuildFailure),

    /// The build succeeded but the follow-up scan failed
    #[error("Rescan after build failed: {0}")]
    Rescan(#[source] ScanError),

    /// The runtime shut down before the check finished
    #[error("Rebuild check was interrupted before it finished")]
    Interrupted,
}

pub type Result<T, E = RebuildError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error(kind: std::io::ErrorKind) -> std::io::Error {
        std::io::Error::new(kind, "boom")
    }

    #[test]
    fn test_scan_error_message() {
        let err = ScanError {
            path: PathBuf::from("site/missing"),
            source: io_error(std::io::ErrorKind::NotFound),
            partial: vec![FileEntry::new("site", 1)],
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to scan"));
        assert!(msg.contains("site/missing"));
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_build_failure_accessors() {
        let err = BuildFailure::Spawn {
            command: "make".to_string(),
            source: io_error(std::io::ErrorKind::NotFound),
            output: "partial".to_string(),
        };
        assert_eq!(err.output(), "partial");
        assert_eq!(err.command(), "make");
        assert_eq!(err.exit_code(), None);
        assert!(err.to_string().contains("Failed to start build command `make`"));
    }

    #[test]
    fn test_timed_out_message() {
        let err = BuildFailure::TimedOut {
            command: "sleep 10".to_string(),
            after: Duration::from_millis(1500),
            output: String::new(),
        };
        assert!(err.to_string().contains("timed out after 1.5s"));
    }

    #[test]
    fn test_rebuild_error_wraps_variants() {
        let build = RebuildError::from(BuildFailure::TimedOut {
            command: "x".to_string(),
            after: Duration::from_secs(1),
            output: String::new(),
        });
        assert!(matches!(build, RebuildError::Build(_)));
        assert!(build.to_string().starts_with("Build error:"));

        let rescan = RebuildError::Rescan(ScanError {
            path: PathBuf::from("out"),
            source: io_error(std::io::ErrorKind::PermissionDenied),
            partial: vec![],
        });
        assert!(rescan.to_string().starts_with("Rescan after build failed:"));
    }
}
