//! `fresh serve`: the dev server.
//!
//! - Load and validate configuration
//! - Run the first rebuild check eagerly so problems show up at start-up
//! - Serve until Ctrl+C, checking for changes before every request

use crate::cli::ServeArgs;
use crate::commands::{coordinator_for, report_check};
use crate::config::{ConfigOverrides, FreshConfig};
use crate::error::Result;
use crate::server::{self, ServerState};
use crate::ui;
use std::sync::Arc;
use tokio::signal;

/// Execute the serve command.
///
/// A failed start-up check is reported but does not stop the server: the
/// next request retries it, and the error page shows the build output.
///
/// # Errors
///
/// Returns errors for invalid configuration and for bind or serve failures.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = FreshConfig::load(&ConfigOverrides::from(&args), args.config.as_deref())?;
    config.validate_for_serve()?;

    ui::info(&format!("Root: {}", config.root.display()));
    match config.build.as_deref() {
        Some(command) => ui::info(&format!("Build command: {}", command)),
        None => ui::info("No build command; serving files as they are"),
    }
    if let Some(timeout) = config.build_timeout() {
        ui::info(&format!("Build timeout: {}", ui::format_duration(timeout)));
    }

    let coordinator = Arc::new(coordinator_for(&config));

    ui::info("Running initial build check...");
    let initial = coordinator.rebuild_if_necessary().await;
    report_check(&initial);
    if initial.is_err() {
        ui::warning("Serving anyway; requests will retry the build");
    }

    let state = ServerState::new(coordinator, config.listing);
    server::run(&config.addr(), state, shutdown_signal()).await?;

    ui::info("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
}
