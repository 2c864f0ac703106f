//! Hierarchical configuration loading via figment.
//!
//! Grounded on the teacher's `infrastructure::config::loader::ConfigLoader`:
//! defaults, then project YAML, then a local override file, then prefixed
//! env vars, each merge overriding the last.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("storage.backend must be 'memory' or 'sqlite', got '{0}'")]
    InvalidStorageBackend(String),

    #[error("storage.sqlite_path must not be empty when storage.backend is 'sqlite'")]
    EmptySqlitePath,

    #[error("web_client.backend must be 'noop' or 'http', got '{0}'")]
    InvalidWebClientBackend(String),

    #[error("web_client.rate_limit_per_host_per_sec must be positive")]
    InvalidRateLimit,

    #[error("logging.level must be one of trace, debug, info, warn, error, got '{0}'")]
    InvalidLogLevel(String),

    #[error("logging.format must be 'json' or 'pretty', got '{0}'")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (`Config::default`)
    /// 2. `.ouroboros/config.yaml` (project config)
    /// 3. `.ouroboros/local.yaml` (project local overrides, optional)
    /// 4. Environment variables (`OUROBOROS_` prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".ouroboros/config.yaml"))
            .merge(Yaml::file(".ouroboros/local.yaml"))
            .merge(Env::prefixed("OUROBOROS_").split("__"))
            .extract()
            .context("failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, skipping the project/local/env layers.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!("failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if !matches!(config.storage.backend.as_str(), "memory" | "sqlite") {
            return Err(ConfigError::InvalidStorageBackend(config.storage.backend.clone()));
        }
        if config.storage.backend == "sqlite" && config.storage.sqlite_path.is_empty() {
            return Err(ConfigError::EmptySqlitePath);
        }

        if !matches!(config.web_client.backend.as_str(), "noop" | "http") {
            return Err(ConfigError::InvalidWebClientBackend(config.web_client.backend.clone()));
        }
        if config.web_client.rate_limit_per_host_per_sec == 0 {
            return Err(ConfigError::InvalidRateLimit);
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
