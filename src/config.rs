//! Configuration management for platform-variant
//!
//! Config file location:
//! - Linux: ~/.config/platform-variant/config.toml
//! - macOS: ~/Library/Application Support/dev.platform-variant.platform-variant/config.toml
//! - Windows: %APPDATA%/platform-variant/platform-variant/config/config.toml
//!
//! You can override the config location by setting `PLATFORM_VARIANT_CONFIG_PATH`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::hardware::cpu::ARCHITECTURE_FIELD;
use crate::hardware::cpuinfo::PROC_CPUINFO;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where and what to read when detecting the variant
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Log output defaults
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or fall back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("PLATFORM_VARIANT_CONFIG_PATH") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let proj_dirs = ProjectDirs::from("dev", "platform-variant", "platform-variant")
            .context("Could not determine project directories")?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }
}

/// Detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// CPU info pseudo-file to scan
    #[serde(default = "default_cpuinfo_path")]
    pub cpuinfo_path: PathBuf,

    /// Field holding the ARM architecture revision
    #[serde(default = "default_field")]
    pub field: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cpuinfo_path: default_cpuinfo_path(),
            field: default_field(),
        }
    }
}

fn default_cpuinfo_path() -> PathBuf {
    PathBuf::from(PROC_CPUINFO)
}

fn default_field() -> String {
    ARCHITECTURE_FIELD.to_string()
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset (e.g., "warn", "platform_variant=debug")
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "warn".to_string()
}
