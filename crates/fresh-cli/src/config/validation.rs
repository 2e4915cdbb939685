use crate::config::FreshConfig;
use crate::error::{ConfigError, Result};

impl FreshConfig {
    /// Treat an empty or whitespace-only build command as no build command.
    pub(crate) fn normalized(mut self) -> Self {
        self.build = self.build.filter(|cmd| !cmd.trim().is_empty());
        self
    }

    /// Validate settings shared by every command.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the root is missing or is
    /// not a directory, or the build timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.root.exists() {
            return Err(ConfigError::InvalidValue {
                field: "root".to_string(),
                value: self.root.display().to_string(),
                hint: "The directory to serve must exist. Create it or pass another ROOT"
                    .to_string(),
            }
            .into());
        }

        if !self.root.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "root".to_string(),
                value: self.root.display().to_string(),
                hint: "ROOT must be a directory, not a file".to_string(),
            }
            .into());
        }

        if self.build_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "buildTimeoutSecs".to_string(),
                value: "0".to_string(),
                hint: "Use a positive number of seconds, or omit it to wait forever".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Validate settings for `fresh serve`.
    pub fn validate_for_serve(&self) -> Result<()> {
        self.validate()?;

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: "0".to_string(),
                hint: "Pick a port between 1 and 65535".to_string(),
            }
            .into());
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "host".to_string(),
                value: format!("{:?}", self.host),
                hint: "Use an address such as 127.0.0.1 or 0.0.0.0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
