//! Runtime settings.
//!
//! Precedence: built-in defaults, then an optional `geopulse.toml`, then
//! `GEOPULSE_*` environment variables (a `.env` file is loaded into the
//! environment at startup). Credentials never live in the config file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::collector::RetryPolicy;
use crate::source::http::DEFAULT_BASE_URL;

/// Config file probed in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "geopulse.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Collector tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    /// Fixed wait between retries of a failed page, in seconds.
    pub retry_delay_secs: u64,
    /// Maximum attempts per page; omit for unbounded.
    pub retry_max_attempts: Option<u32>,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            retry_delay_secs: 15 * 60,
            retry_max_attempts: None,
        }
    }
}

/// Top-level settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Search API base URL.
    pub api_base_url: String,
    /// Bearer token for the search API.
    pub bearer_token: Option<String>,
    /// HTTP request timeout in seconds.
    pub request_timeout: u64,
    /// Collector tuning.
    pub collector: CollectorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            bearer_token: None,
            request_timeout: 30,
            collector: CollectorSettings::default(),
        }
    }
}

impl Settings {
    /// Retry policy derived from the collector settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            delay: Duration::from_secs(self.collector.retry_delay_secs),
            max_attempts: self.collector.retry_max_attempts,
        }
    }

    /// HTTP timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Apply environment overrides through a lookup function (the real
    /// environment in production, a map in tests).
    pub fn apply_env<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = get("GEOPULSE_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(token) = get("GEOPULSE_BEARER_TOKEN") {
            self.bearer_token = Some(token);
        }
        if let Some(delay) = get("GEOPULSE_RETRY_DELAY_SECS").and_then(|v| v.parse().ok()) {
            self.collector.retry_delay_secs = delay;
        }
        if let Some(max) = get("GEOPULSE_RETRY_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.collector.retry_max_attempts = Some(max);
        }
    }
}

/// Load settings: defaults, optional config file, environment overrides.
///
/// An explicit `--config` path must exist; the default `geopulse.toml` is
/// only read when present.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = match config_path {
        Some(path) => read_config_file(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                read_config_file(default)?
            } else {
                Settings::default()
            }
        }
    };

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}

fn read_config_file(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
