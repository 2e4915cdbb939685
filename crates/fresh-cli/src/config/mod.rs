//! Configuration for the Fresh CLI.
//!
//! Settings are merged from several sources, highest priority first:
//!
//! 1. Command-line flags
//! 2. Environment variables prefixed with `FRESH_` (e.g. `FRESH_PORT=3000`,
//!    `FRESH_BUILD_TIMEOUT_SECS=60`)
//! 3. `fresh.config.json` in the working directory, or the file given with
//!    `--config`
//! 4. Built-in defaults
//!
//! ```json
//! {
//!   "root": "public",
//!   "build": "make site",
//!   "port": 3000,
//!   "buildTimeoutSecs": 120
//! }
//! ```

mod defaults;
mod loading;
mod validation;

pub use loading::{ConfigOverrides, CONFIG_FILE_NAME};

use defaults::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Resolved Fresh configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FreshConfig {
    /// Directory to serve and fingerprint
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Shell command that rebuilds the tree; none serves it as is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,

    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Kill builds that run longer than this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_timeout_secs: Option<u64>,

    /// List directories that have no index.html
    #[serde(default = "default_listing")]
    pub listing: bool,
}

impl Default for FreshConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            build: None,
            host: default_host(),
            port: default_port(),
            build_timeout_secs: None,
            listing: default_listing(),
        }
    }
}

impl FreshConfig {
    /// Build timeout as a `Duration`.
    pub fn build_timeout(&self) -> Option<Duration> {
        self.build_timeout_secs.map(Duration::from_secs)
    }

    /// `host:port` for binding.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
