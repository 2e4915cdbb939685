//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use fresh_core::RebuildError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Rebuild(e) => rebuild_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Server(message) => miette::miette!("Server error: {}", message),
    }
}

/// Convert RebuildError to miette Report, keeping build output visible.
pub fn rebuild_error_to_miette(err: RebuildError) -> Report {
    match err {
        RebuildError::Build(failure) => miette::miette!(
            help = "Fix the build and request any page to retry",
            "{}",
            failure
        ),
        RebuildError::Scan(scan) | RebuildError::Rescan(scan) => miette::miette!(
            help = "Check that the root directory exists and is readable",
            "{}",
            scan
        ),
        other @ RebuildError::Interrupted => miette::miette!("{}", other),
    }
}
