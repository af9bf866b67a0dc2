//! Configuration for papershelf
//!
//! Settings are read from a TOML file, by default
//! `<config dir>/papershelf/config.toml`. Every section is optional; missing
//! values fall back to the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable that overrides `[ads] token`.
pub const ADS_TOKEN_ENV: &str = "ADS_API_TOKEN";

/// Library-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// SQLite database holding the library
    pub database: PathBuf,
    /// Catalog re-sync behavior
    pub sync: SyncConfig,
    /// Bulk import settings
    pub import: ImportConfig,
    /// NASA ADS connection settings
    pub ads: AdsConfig,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            database: default_data_dir().join("library.db"),
            sync: SyncConfig::default(),
            import: ImportConfig::default(),
            ads: AdsConfig::default(),
        }
    }
}

/// Catalog re-sync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Re-sync stale unpublished papers when the library is opened
    pub resync_on_open: bool,
    /// An unpublished paper is stale once its last sync is this old
    pub stale_after_hours: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            resync_on_open: true,
            stale_after_hours: 24,
        }
    }
}

/// Bulk import configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Where failure reports go; next to the imported file when unset
    pub failure_report_dir: Option<PathBuf>,
}

/// NASA ADS connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdsConfig {
    /// API token; `ADS_API_TOKEN` takes precedence
    pub token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: "https://api.adsabs.harvard.edu/v1".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AdsConfig {
    /// The token to use: the environment first, then the file.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var(ADS_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .or_else(|| self.token.clone())
    }
}

impl LibraryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("papershelf")
            .join("config.toml")
    }

    /// Load from `path`, or return defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.stale_after_hours == 0 {
            return Err(ConfigError::Invalid(
                "sync.stale_after_hours must be positive".to_string(),
            ));
        }
        if self.ads.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "ads.timeout_secs must be positive".to_string(),
            ));
        }
        if self.ads.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("ads.base_url is empty".to_string()));
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("papershelf")
}

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
