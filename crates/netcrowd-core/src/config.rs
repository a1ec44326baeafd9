//! Configuration for netcrowd
//!
//! Stored in `<config dir>/netcrowd/config.toml`, overridable through the
//! `NETCROWD_CONFIG`, `NETCROWD_DATA_DIR` and `NETCROWD_API_PORT`
//! environment variables.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "netcrowd";
const CONFIG_FILE: &str = "config.toml";

pub const CONFIG_ENV: &str = "NETCROWD_CONFIG";
pub const DATA_DIR_ENV: &str = "NETCROWD_DATA_DIR";
pub const API_PORT_ENV: &str = "NETCROWD_API_PORT";

/// netcrowd configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Report ID prefix (e.g., "RPT")
    pub prefix: String,

    /// Directory holding reports.jsonl (platform data dir if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Write the built-in sample reports when no data file exists yet
    pub seed_on_first_run: bool,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// API server settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: crate::id::DEFAULT_PREFIX.to_string(),
            data_dir: None,
            seed_on_first_run: true,
            display: DisplayConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

/// Language used for weekday labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    /// Indonesian
    Id,
}

impl Locale {
    /// Abbreviated weekday name
    pub fn weekday_abbrev(&self, day: Weekday) -> &'static str {
        match self {
            Locale::En => match day {
                Weekday::Mon => "Mon",
                Weekday::Tue => "Tue",
                Weekday::Wed => "Wed",
                Weekday::Thu => "Thu",
                Weekday::Fri => "Fri",
                Weekday::Sat => "Sat",
                Weekday::Sun => "Sun",
            },
            Locale::Id => match day {
                Weekday::Mon => "Sen",
                Weekday::Tue => "Sel",
                Weekday::Wed => "Rab",
                Weekday::Thu => "Kam",
                Weekday::Fri => "Jum",
                Weekday::Sat => "Sab",
                Weekday::Sun => "Min",
            },
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// strftime format for the human-readable report timestamp
    pub timestamp_format: String,

    /// Weekday label language for trend output
    pub locale: Locale,

    /// Use colors in CLI output
    pub colors: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timestamp_format: "%d/%m/%Y, %H.%M".to_string(),
            locale: Locale::default(),
            colors: true,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// How often to check the data file for writes from other processes
    pub sync_interval_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3848,
            sync_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Load from the default location and apply environment overrides
    pub fn load_default() -> crate::Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Config file location: `$NETCROWD_CONFIG` or the platform config dir
    pub fn default_path() -> Option<PathBuf> {
        env_path(CONFIG_ENV)
            .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE)))
    }

    /// Override file settings from the environment
    pub fn apply_env(&mut self) {
        if let Some(dir) = env_path(DATA_DIR_ENV) {
            self.data_dir = Some(dir);
        }
        if let Some(port) = std::env::var(API_PORT_ENV)
            .ok()
            .and_then(|p| p.trim().parse().ok())
        {
            self.api.port = port;
        }
    }

    /// Directory the report file lives in
    pub fn resolve_data_dir(&self) -> crate::Result<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
            .ok_or_else(|| crate::Error::Config("Could not determine data directory".into()))
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# netcrowd configuration

# Report ID prefix, IDs look like RPT-001
prefix = "RPT"

# Directory holding reports.jsonl (defaults to the platform data dir)
# data_dir = "/var/lib/netcrowd"

# Write the built-in sample reports when no data file exists yet
seed_on_first_run = true

[display]
# strftime format for the human-readable report timestamp (local time)
timestamp_format = "%d/%m/%Y, %H.%M"

# Weekday label language for the weekly trend (en, id)
locale = "en"

# Use colors in CLI output
colors = true

[api]
host = "127.0.0.1"
port = 3848

# How often the server checks the data file for writes from other processes
sync_interval_ms = 1000
"#
        .to_string()
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}
