//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Display name and units
//! - Notification preferences
//! - Weekly summary toggle
//!
//! Configuration is stored at `~/.config/ecolog/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// General configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_display_name")]
    pub display_name: String,
    /// "metric" or "imperial" for distance display.
    #[serde(default = "default_units")]
    pub units: String,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Daily reminder time "HH:MM", if any.
    #[serde(default)]
    pub daily_reminder: Option<String>,
    #[serde(default = "default_true")]
    pub weekly_summary: bool,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_general")]
    pub general: GeneralConfig,
    #[serde(default = "default_notifications")]
    pub notifications: NotificationsConfig,
}

fn default_display_name() -> String {
    "eco user".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_true() -> bool {
    true
}

fn default_general() -> GeneralConfig {
    GeneralConfig {
        display_name: default_display_name(),
        units: default_units(),
    }
}

fn default_notifications() -> NotificationsConfig {
    NotificationsConfig {
        enabled: true,
        daily_reminder: None,
        weekly_summary: true,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: default_general(),
            notifications: default_notifications(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist yet.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&text).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Save the configuration to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::path()?;
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, text)?;
        Ok(())
    }

    /// Set a dotted key to a value, for `config set` style commands.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "general.display_name" => self.general.display_name = value.to_string(),
            "general.units" => {
                if value != "metric" && value != "imperial" {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: "expected 'metric' or 'imperial'".to_string(),
                    });
                }
                self.general.units = value.to_string();
            }
            "notifications.enabled" => {
                self.notifications.enabled =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: "expected 'true' or 'false'".to_string(),
                    })?;
            }
            "notifications.daily_reminder" => {
                self.notifications.daily_reminder = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "notifications.weekly_summary" => {
                self.notifications.weekly_summary =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: "expected 'true' or 'false'".to_string(),
                    })?;
            }
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "unknown configuration key".to_string(),
                });
            }
        }
        Ok(())
    }
}
