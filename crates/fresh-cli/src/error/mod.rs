//! Error handling for the Fresh CLI.
//!
//! This module provides a hierarchical error type system using `thiserror`.
//! Each variant is meant to be actionable: it says what went wrong and,
//! where there is one, what to do about it.
//!
//! # Architecture
//!
//! - **Top-level errors** (`CliError`) represent broad categories of failures
//! - **Domain-specific errors** (`ConfigError`, `fresh_core::RebuildError`)
//!   carry the detail
//! - **Error conversion** is automatic via `#[from]` attributes
//!
//! # Example
//!
//! ```rust
//! use fresh_cli::error::{CliError, ConfigError};
//! use std::path::PathBuf;
//!
//! let err: CliError = ConfigError::NotFound(PathBuf::from("fresh.config.json")).into();
//! assert!(err.to_string().contains("Hint:"));
//! ```

mod miette;

pub use self::miette::cli_error_to_miette;

use fresh_core::RebuildError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (bad values, unreadable config file)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A rebuild check failed (scan, build, or rescan)
    #[error("{0}")]
    Rebuild(#[from] RebuildError),

    /// HTTP server errors (bind failures, serve loop errors)
    #[error("Server error: {0}")]
    Server(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a fresh.config.json file or drop the --config flag", .0.display())]
    NotFound(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use fresh_core::BuildFailure;

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from("fresh.config.json"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("fresh.config.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "port".to_string(),
            value: "0".to_string(),
            hint: "Pick a port between 1 and 65535".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid value for 'port'"));
        assert!(msg.contains("Pick a port"));
    }

    #[test]
    fn test_cli_error_from_rebuild_error() {
        let rebuild = RebuildError::Build(BuildFailure::Spawn {
            command: "make".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no sh"),
            output: String::new(),
        });
        let cli_err: CliError = rebuild.into();
        assert!(matches!(cli_err, CliError::Rebuild(_)));
        assert!(cli_err.to_string().starts_with("Build error:"));
    }

    #[test]
    fn test_cli_error_from_config_error() {
        let cli_err: CliError = ConfigError::NotFound(PathBuf::from("site.json")).into();
        assert!(matches!(cli_err, CliError::Config(ConfigError::NotFound(_))));
        assert!(cli_err.to_string().starts_with("Configuration error:"));
    }
}
