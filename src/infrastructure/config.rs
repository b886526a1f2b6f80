use crate::domain::error::{MonitorError, MonitorResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persistent user preferences, loaded from
/// `~/.config/serialmon/config.toml`. A missing file means defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// Port to pre-select at startup
    #[serde(default)]
    pub default_port: Option<String>,
    /// Baud rate to pre-select at startup
    #[serde(default = "default_baud")]
    pub default_baud: u32,
    /// Default log level filter
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_baud() -> u32 {
    9600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            default_port: None,
            default_baud: default_baud(),
            log_level: default_log_level(),
        }
    }
}

impl MonitorConfig {
    /// Load from the user config path, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> MonitorResult<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> MonitorResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| MonitorError::Config {
            message: format!("failed to read config file {}: {}", path.display(), e),
        })?;
        toml::from_str(&content).map_err(|e| MonitorError::Config {
            message: format!("failed to parse config file {}: {}", path.display(), e),
        })
    }

    pub fn save_to_path(&self, path: &Path) -> MonitorResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| MonitorError::Config {
                message: format!("failed to create config directory: {}", e),
            })?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| MonitorError::Config {
            message: format!("failed to serialize config: {}", e),
        })?;
        fs::write(path, content).map_err(|e| MonitorError::Config {
            message: format!("failed to write config file {}: {}", path.display(), e),
        })
    }

    fn config_path() -> MonitorResult<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| MonitorError::Config {
            message: "could not determine config directory".to_string(),
        })?;
        Ok(base.join("serialmon").join("config.toml"))
    }
}
