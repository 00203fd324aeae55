// src/config/mod.rs
pub mod io;
pub mod types;

pub use self::io::CONFIG_FILE;
pub use self::types::{
    BuildConfig, GitConfig, MetricsConfig, OracleConfig, PathsConfig, RefAgentToml,
    RefactorConfig,
};

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;

use crate::error::{RefAgentError, Result};

/// Runtime configuration: the parsed `refagent.toml` plus derived values.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: RefAgentToml,
    pub exclude_patterns: Vec<Regex>,
    pub verbose: bool,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `refagent.toml` from the working directory, or the file given
    /// explicitly. Only an explicit path must exist.
    ///
    /// # Errors
    /// Returns error on unreadable or malformed configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit.map_or_else(|| PathBuf::from(CONFIG_FILE), Path::to_path_buf);
        match io::read_optional(&path)? {
            Some(content) => {
                tracing::debug!(path = %path.display(), "loaded configuration");
                Self::from_toml(&content)
            }
            None if explicit.is_some() => Err(RefAgentError::Config(format!(
                "config file not found: {}",
                path.display()
            ))),
            None => Ok(Self::new()),
        }
    }

    /// # Errors
    /// Returns error on malformed TOML or an invalid exclude pattern.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings = io::parse_toml(content)?;
        let config = Self {
            exclude_patterns: io::compile_patterns(&settings.paths.exclude)?,
            settings,
            verbose: false,
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns error when a value cannot drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.settings.refactor.max_iterations == 0 {
            return Err(RefAgentError::Config(
                "refactor.max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.settings.build.test_command.contains("{class}") {
            tracing::warn!("build.test_command has no {{class}} placeholder; every test run is the full suite");
        }
        Ok(())
    }

    /// The oracle API key from the configured environment variable.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.settings.oracle.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    #[must_use]
    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.build.timeout_secs)
    }

    #[must_use]
    pub fn metrics_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.metrics.timeout_secs)
    }

    /// Saves the current settings to `path`.
    ///
    /// # Errors
    /// Returns error if file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        io::save_to_file(&self.settings, path)
    }
}
