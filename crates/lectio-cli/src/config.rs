//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for lectio
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("./corpus"),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout: u64,
    /// Retry attempts for transient failures
    pub max_retries: u32,
    /// Exponential backoff base in milliseconds
    pub base_delay_ms: u64,
    /// Minimum milliseconds between requests (politeness interval)
    pub interval_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            max_retries: 3,
            base_delay_ms: 2000,
            interval_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./lectio.toml (current directory)
    /// 2. ~/.config/lectio/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("lectio.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "lectio") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Fetch options assembled from the HTTP section.
    pub fn fetch_options(&self) -> lectio_core::FetchOptions {
        lectio_core::FetchOptions {
            max_retries: self.http.max_retries,
            base_delay: std::time::Duration::from_millis(self.http.base_delay_ms),
            timeout: std::time::Duration::from_secs(self.http.timeout),
        }
    }

    /// Politeness interval between requests.
    pub fn request_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.http.interval_ms)
    }
}
