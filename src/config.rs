//! Configuration management for the timesheets client
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    APP_NAME, CONFIG_GENERATED, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, LOCAL_CONFIG_FILE, MAX_TIMEOUT_SECS,
    MIN_TIMEOUT_SECS,
};
use crate::entities::EntityKind;
use crate::utils::datetime;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the JSON:API backend, without trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Fetch the preloaded entity types when the client starts
    pub fetch_on_startup: bool,
    /// Wire type names fetched on startup ("users", "timesheets", ...)
    pub preload: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Minimum level ("error", "warn", "info", "debug", "trace")
    pub level: String,
    /// Log file path; defaults to the data directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_on_startup: true,
            preload: EntityKind::ALL.iter().map(|kind| kind.type_name().to_string()).collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            file: None,
        }
    }
}

impl SyncConfig {
    /// Entity kinds named in `preload`, skipping unknown names
    pub fn preload_kinds(&self) -> Vec<EntityKind> {
        self.preload
            .iter()
            .filter_map(|name| EntityKind::from_type_name(name))
            .collect()
    }
}

impl LoggingConfig {
    /// Parsed log level
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        log::LevelFilter::from_str(&self.level).with_context(|| format!("Invalid log level '{}'", self.level))
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        let current_dir_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join(APP_NAME).join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.as_str();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!("base_url must start with http:// or https://, got '{}'", base_url);
        }

        if self.api.timeout_secs < MIN_TIMEOUT_SECS || self.api.timeout_secs > MAX_TIMEOUT_SECS {
            anyhow::bail!(
                "timeout_secs must be between {} and {} seconds, got {}",
                MIN_TIMEOUT_SECS,
                MAX_TIMEOUT_SECS,
                self.api.timeout_secs
            );
        }

        for name in &self.sync.preload {
            if EntityKind::from_type_name(name).is_none() {
                let known: Vec<&str> = EntityKind::ALL.iter().map(|kind| kind.type_name()).collect();
                anyhow::bail!("Unknown entity type '{}' in preload. Known types: {}", name, known.join(", "));
            }
        }

        self.logging.level_filter()?;

        Ok(())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        let header = format!(
            "# Timesheets Configuration File\n# Generated on {}\n\n",
            chrono::Local::now().format(datetime::DATE_FORMAT)
        );

        let full_content = header + &toml_content;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        println!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join(APP_NAME))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }
}
