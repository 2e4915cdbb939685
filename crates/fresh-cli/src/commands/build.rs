//! `fresh build`: one rebuild check, then exit.

use crate::cli::BuildArgs;
use crate::commands::{coordinator_for, report_check};
use crate::config::{ConfigOverrides, FreshConfig};
use crate::error::Result;
use crate::ui;
use std::sync::Arc;

/// Execute the build command.
///
/// Runs exactly the check the server would run on its first request: scan,
/// compare against an empty baseline, build, rescan.
///
/// # Errors
///
/// Returns configuration errors, or the [`RebuildError`](fresh_core::RebuildError)
/// from the check so the process exits non-zero.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let config = FreshConfig::load(&ConfigOverrides::from(&args), args.config.as_deref())?;
    config.validate()?;

    match config.build.as_deref() {
        Some(command) => ui::banner(
            "Building",
            &format!("{} ({})", config.root.display(), command),
        ),
        None => ui::banner("Scanning", &config.root.display().to_string()),
    }

    let coordinator = Arc::new(coordinator_for(&config));
    let result = coordinator.rebuild_if_necessary().await;

    // On error main renders the report.
    if result.is_ok() {
        report_check(&result);
        ui::info(&format!(
            "{} paths fingerprinted",
            coordinator.baseline().len()
        ));
    }

    result.map(|_| ()).map_err(Into::into)
}
