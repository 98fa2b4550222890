//! Configuration management for the menu host.
//!
//! Loads the TOML configuration file, creating a default one when it is missing, and
//! validates it before the engine starts.

use menu_engine::EngineSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

fn default_tick_interval() -> u64 {
    50 // 20 ticks per second
}

fn default_layout_directory() -> String {
    "layouts".to_string()
}

fn default_messages_file() -> String {
    "messages.toml".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Engine-wide menu settings
    #[serde(default)]
    pub engine: EngineSettings,
    /// Host process settings
    #[serde(default)]
    pub host: HostSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSettings {
    /// Interval of the synchronous tick loop in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Directory holding one TOML file per layout
    #[serde(default = "default_layout_directory")]
    pub layout_directory: String,
    /// Message file; engine defaults are used when it does not exist
    #[serde(default = "default_messages_file")]
    pub messages_file: String,
    /// Worker threads for texture lookups. Defaults to the number of CPUs.
    #[serde(default)]
    pub async_workers: Option<usize>,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            layout_directory: default_layout_directory(),
            messages_file: default_messages_file(),
            async_workers: None,
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration to `path` and
    /// returns it.
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    pub fn layout_directory(&self) -> PathBuf {
        PathBuf::from(&self.host.layout_directory)
    }

    pub fn messages_file(&self) -> PathBuf {
        PathBuf::from(&self.host.messages_file)
    }

    /// Async worker count, falling back to the number of CPUs.
    pub fn async_workers(&self) -> usize {
        self.host.async_workers.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        self.engine.validate()?;

        if self.host.tick_interval_ms == 0 {
            return Err("Tick interval must be greater than zero".to_string());
        }
        if self.host.layout_directory.is_empty() {
            return Err("Layout directory cannot be empty".to_string());
        }
        if self.host.async_workers == Some(0) {
            return Err("Async workers must be greater than zero".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}
