//! `Config`: the figment-loadable configuration struct.
//!
//! Grounded on the teacher's `domain/models/config.rs` (defaults-first struct
//! deserialized by the infrastructure config loader) and
//! `infrastructure/config/loader.rs` (the merge order: defaults -> project
//! YAML -> local YAML override -> prefixed env vars).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `memory` or `sqlite`.
    pub backend: String,
    /// sqlite DSN, ignored for the in-memory backend.
    pub sqlite_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: "memory".to_string(), sqlite_path: "ouroboros.db".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebClientConfig {
    /// `noop` or `http`.
    pub backend: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub rate_limit_per_host_per_sec: u32,
    pub max_retries: u32,
    pub cache_ttl_secs: u64,
}

impl Default for WebClientConfig {
    fn default() -> Self {
        Self {
            backend: "noop".to_string(),
            user_agent: "ouroboros-engine/0.1".to_string(),
            request_timeout_secs: 10,
            rate_limit_per_host_per_sec: 2,
            max_retries: 3,
            cache_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn`, `error`.
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string(), directory: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub web_client: WebClientConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            web_client: WebClientConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
