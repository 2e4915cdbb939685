use crate::cli::{BuildArgs, ServeArgs};
use crate::config::FreshConfig;
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "fresh.config.json";

/// Environment keys (after the `FRESH_` prefix) that map onto config fields.
const ENV_KEYS: &[&str] = &[
    "root",
    "build",
    "host",
    "port",
    "build_timeout_secs",
    "listing",
];

/// Values given on the command line. Unset fields leave lower-priority
/// sources alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<bool>,
}

impl From<&ServeArgs> for ConfigOverrides {
    fn from(args: &ServeArgs) -> Self {
        Self {
            root: args.root.clone(),
            build: args.build.clone(),
            host: args.host.clone(),
            port: args.port,
            build_timeout_secs: args.build_timeout,
            listing: args.no_listing.then_some(false),
        }
    }
}

impl From<&BuildArgs> for ConfigOverrides {
    fn from(args: &BuildArgs) -> Self {
        Self {
            root: args.root.clone(),
            build: args.build.clone(),
            build_timeout_secs: args.build_timeout,
            ..Self::default()
        }
    }
}

impl FreshConfig {
    /// Load configuration from all sources, looking for the config file in
    /// the process working directory.
    pub fn load(overrides: &ConfigOverrides, config_path: Option<&Path>) -> Result<Self> {
        Self::load_from(overrides, config_path, Path::new("."))
    }

    /// Load configuration, looking for `fresh.config.json` under `cwd` when
    /// no explicit `config_path` is given.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NotFound`] if `config_path` does not exist
    /// - [`ConfigError::InvalidValue`] for malformed files, unknown fields,
    ///   or values of the wrong type
    pub fn load_from(
        overrides: &ConfigOverrides,
        config_path: Option<&Path>,
        cwd: &Path,
    ) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) if path.is_file() => Some(path.to_path_buf()),
            Some(path) => return Err(ConfigError::NotFound(path.to_path_buf()).into()),
            None => {
                let default_path = cwd.join(CONFIG_FILE_NAME);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            tracing::debug!("Loading config from {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        // FRESH_PORT, FRESH_BUILD_TIMEOUT_SECS, ...
        figment = figment.merge(
            Env::prefixed("FRESH_")
                .only(ENV_KEYS)
                .map(|key| snake_to_camel(key.as_str()).into())
                .lowercase(false),
        );

        figment = figment.merge(Serialized::defaults(overrides));

        let config: Self = figment.extract().map_err(|e| {
            let field = if e.path.is_empty() {
                "configuration".to_string()
            } else {
                e.path.join(".")
            };
            ConfigError::InvalidValue {
                field,
                value: e.kind.to_string(),
                hint: format!("Check {} syntax and FRESH_* environment variables", CONFIG_FILE_NAME),
            }
        })?;

        Ok(config.normalized())
    }
}

fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for ch in key.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}
