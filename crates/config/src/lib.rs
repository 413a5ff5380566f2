#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for ksync
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/ksync/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

use ksync_errors::{ConfigError, Error};
use ksync_types::Timeout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub semaphore: SemaphoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub stress: StressConfig,
}

/// Semaphore table defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemaphoreConfig {
    #[serde(default = "default_initial_count")]
    pub default_initial_count: u32,
    /// Absent means wait forever
    #[serde(default)]
    pub default_timeout_ms: Option<u64>,
    #[serde(default = "default_abandon_on_delete")]
    pub abandon_waiters_on_delete: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

/// Stress driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressConfig {
    #[serde(default)]
    pub workers: usize, // 0 = auto-detect
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

// Default implementations

impl Default for SemaphoreConfig {
    fn default() -> Self {
        Self {
            default_initial_count: default_initial_count(),
            default_timeout_ms: None,
            abandon_waiters_on_delete: default_abandon_on_delete(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            iterations: default_iterations(),
        }
    }
}

// Default value functions for serde
fn default_initial_count() -> u32 {
    1
}

fn default_abandon_on_delete() -> bool {
    true
}

fn default_log_filter() -> String {
    "warn,ksync=info".to_string()
}

fn default_iterations() -> usize {
    1000
}

impl SemaphoreConfig {
    /// Timeout applied when a caller does not pass one explicitly
    #[must_use]
    pub fn default_timeout(&self) -> Timeout {
        Timeout::from(self.default_timeout_ms.map(Duration::from_millis))
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("ksync").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Render the configuration as TOML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, Error> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError {
                error: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // KSYNC_DEFAULT_TIMEOUT_MS ("none" restores infinite waits)
        if let Ok(timeout) = std::env::var("KSYNC_DEFAULT_TIMEOUT_MS") {
            self.semaphore.default_timeout_ms = match timeout.as_str() {
                "none" | "infinite" => None,
                _ => Some(timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "KSYNC_DEFAULT_TIMEOUT_MS".to_string(),
                    value: timeout.clone(),
                })?),
            };
        }

        // KSYNC_DEFAULT_INITIAL_COUNT
        if let Ok(count) = std::env::var("KSYNC_DEFAULT_INITIAL_COUNT") {
            self.semaphore.default_initial_count =
                count.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "KSYNC_DEFAULT_INITIAL_COUNT".to_string(),
                    value: count,
                })?;
        }

        // KSYNC_LOG_FILTER
        if let Ok(filter) = std::env::var("KSYNC_LOG_FILTER") {
            self.logging.filter = filter;
        }

        // KSYNC_LOG_JSON
        if let Ok(json) = std::env::var("KSYNC_LOG_JSON") {
            self.logging.json = match json.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "KSYNC_LOG_JSON".to_string(),
                        value: json,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }
}

/// Calculate stress worker count based on CPU count
#[must_use]
pub fn calculate_workers(config_value: usize) -> usize {
    if config_value > 0 {
        config_value // User override
    } else {
        num_cpus::get().max(2)
    }
}
