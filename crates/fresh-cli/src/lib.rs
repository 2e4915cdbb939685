//! Fresh CLI - a dev server that rebuilds on request.
//!
//! The engine lives in `fresh-core`; this crate wraps it in a command line,
//! configuration loading, terminal output, and an HTTP server.
//!
//! - [`cli`] - clap argument definitions
//! - [`config`] - figment-based configuration
//! - [`error`] - error types with actionable messages
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines on stderr
//! - [`server`] - axum router serving the tree
//! - [`commands`] - `serve` and `build`

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod server;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
