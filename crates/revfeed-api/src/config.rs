//! Service configuration
//!
//! Read from TOML; every key has a default so an empty file is valid.
//! `REVFEED_TIME_BUDGET_MS` overrides `feed.time_budget_ms`.

use revfeed_core::logging_facility::Profile;
use revfeed_engine::FeedSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the time budget
pub const TIME_BUDGET_ENV: &str = "REVFEED_TIME_BUDGET_MS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub feed: FeedConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// PARTIAL kicks in once a batch runs longer than this
    #[serde(default = "default_time_budget_ms")]
    pub time_budget_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_profile")]
    pub profile: Profile,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_time_budget_ms() -> u64 {
    revfeed_engine::settings::DEFAULT_TIME_BUDGET.as_millis() as u64
}

fn default_database() -> PathBuf {
    PathBuf::from("revfeed.db")
}

fn default_profile() -> Profile {
    Profile::Production
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: default_time_budget_ms(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
        }
    }
}

impl ServiceConfig {
    /// Load `path` and apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)?.with_env(|key| std::env::var(key).ok())
    }

    /// Parse TOML text, without environment overrides
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply overrides looked up through `lookup`
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(TIME_BUDGET_ENV) {
            self.feed.time_budget_ms =
                raw.trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                        key: TIME_BUDGET_ENV.to_string(),
                        reason: e.to_string(),
                    })?;
        }
        Ok(self)
    }

    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings::with_time_budget(Duration::from_millis(self.feed.time_budget_ms))
    }
}
