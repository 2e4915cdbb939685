//! Command implementations.
//!
//! Each subcommand resolves its configuration, builds a
//! [`RebuildCoordinator`](fresh_core::RebuildCoordinator), and drives it.

mod build;
mod serve;

pub use build::execute as build_execute;
pub use serve::execute as serve_execute;

use crate::config::FreshConfig;
use crate::ui;
use fresh_core::{BuildRunner, RebuildCoordinator, RebuildError, RebuildStatus};

/// Build a coordinator for a validated configuration.
///
/// The build command runs from the process working directory, which is
/// where relative paths in it (and `root` itself) are resolved.
pub(crate) fn coordinator_for(config: &FreshConfig) -> RebuildCoordinator {
    let runner = BuildRunner::new(config.build.clone()).with_timeout(config.build_timeout());
    RebuildCoordinator::new(config.root.clone(), runner)
}

/// Print the outcome of a rebuild check.
pub(crate) fn report_check(result: &Result<RebuildStatus, RebuildError>) {
    match result {
        Ok(RebuildStatus::UpToDate) => ui::success("Site is up to date"),
        Ok(RebuildStatus::Rebuilt(report)) if report.ran => ui::success(&format!(
            "Build finished in {}",
            ui::format_duration(report.elapsed)
        )),
        Ok(RebuildStatus::Rebuilt(_)) => ui::success("Fingerprint captured, no build command"),
        Err(err) => ui::error(&err.to_string()),
    }
}
