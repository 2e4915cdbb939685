//! Logging setup for the Fresh CLI.
//!
//! `fresh-core` only emits `tracing` events; this module decides how they
//! are rendered. Verbosity comes from the global flags, falling back to
//! `RUST_LOG` and then to info level for the fresh crates.
//!
//! # Example
//!
//! ```rust,no_run
//! use fresh_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("Serving public/");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "fresh=debug,fresh_core=debug,fresh_cli=debug,tower_http=debug";
const QUIET_FILTER: &str = "fresh=error,fresh_core=error,fresh_cli=error";
const DEFAULT_FILTER: &str = "fresh=info,fresh_core=info,fresh_cli=info";

/// Initialize the tracing subscriber.
///
/// Call once at start-up, before anything logs.
///
/// # Arguments
///
/// * `verbose` - Debug-level logging for the fresh crates and request traces
/// * `quiet` - Errors only
/// * `no_color` - Disable ANSI colors
///
/// `--verbose` and `--quiet` take precedence over `RUST_LOG`.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize the subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
