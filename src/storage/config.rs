//! Configuration handling for tick
//!
//! Settings are stored in `<home>/config.toml`. When a home has no config
//! file, the global `~/.config/tick/config.toml` is used instead.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::SortOrder;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown configuration key '{key}' (known keys: {})", Settings::KEYS.join(", "))]
    UnknownKey { key: String },

    #[error("Invalid value '{value}' for '{key}': {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// User-tunable defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sort order for listings and for the saved list
    pub default_orderby: String,

    /// Reassign IDs 0..N-1 in save order on every save
    pub renumber_on_save: bool,

    /// strftime pattern for rendering due dates
    pub date_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_orderby: "id+".to_string(),
            renumber_on_save: false,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl Settings {
    pub const KEYS: [&'static str; 3] = ["default_orderby", "renumber_on_save", "date_format"];

    /// Reads a setting as a string
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "default_orderby" => Ok(self.default_orderby.clone()),
            "renumber_on_save" => Ok(self.renumber_on_save.to_string()),
            "date_format" => Ok(self.date_format.clone()),
            _ => Err(ConfigError::UnknownKey {
                key: key.to_string(),
            }),
        }
    }

    /// Validates and stores a setting given as a string
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        match key {
            "default_orderby" => {
                value
                    .parse::<SortOrder>()
                    .map_err(|e| invalid(e.to_string()))?;
                self.default_orderby = value.to_string();
            }
            "renumber_on_save" => {
                self.renumber_on_save = value
                    .parse()
                    .map_err(|_| invalid("expected 'true' or 'false'".to_string()))?;
            }
            "date_format" => {
                if value.trim().is_empty() {
                    return Err(invalid("format must not be empty".to_string()));
                }
                self.date_format = value.to_string();
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Checks the values a hand-edited file may get wrong
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_orderby
            .parse::<SortOrder>()
            .map(|_| ())
            .map_err(|e| ConfigError::Invalid {
                key: "default_orderby".to_string(),
                value: self.default_orderby.clone(),
                reason: e.to_string(),
            })
    }

    /// The parsed default sort order; loaded settings are validated
    pub fn sort_order(&self) -> SortOrder {
        self.default_orderby.parse().unwrap_or_default()
    }
}

/// Loaded configuration plus where it is written back to
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    path: PathBuf,
}

impl Config {
    /// Loads the configuration for a home directory
    pub fn load(home: &Path) -> Result<Self> {
        let path = home.join("config.toml");

        let settings = if path.exists() {
            Self::read(&path)?
        } else {
            match Self::global_config_dir().map(|dir| dir.join("config.toml")) {
                Some(global) if global.exists() => Self::read(&global)?,
                _ => Settings::default(),
            }
        };

        Ok(Self { settings, path })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "tick", "tick-cli").map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn read(path: &Path) -> Result<Settings> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        settings
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(settings)
    }

    /// Returns the file this configuration saves to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the settings to the home's config file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content =
            toml::to_string_pretty(&self.settings).context("Failed to serialize config")?;

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write config: {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.default_orderby, "id+");
        assert!(!settings.renumber_on_save);
        assert_eq!(settings.sort_order(), SortOrder::by_id());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
default_orderby = "priority-id+"
"#;

        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.default_orderby, "priority-id+");
        assert_eq!(settings.date_format, "%Y-%m-%d");
    }

    #[test]
    fn get_and_set_by_key() {
        let mut settings = Settings::default();
        settings.set("renumber_on_save", "true").unwrap();
        settings.set("default_orderby", "duedate+").unwrap();

        assert_eq!(settings.get("renumber_on_save").unwrap(), "true");
        assert_eq!(settings.get("default_orderby").unwrap(), "duedate+");
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.set("default_orderby", "colour+"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            settings.set("renumber_on_save", "sometimes"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            settings.get("colour"),
            Err(ConfigError::UnknownKey { .. })
        ));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn invalid_orderby_in_file_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "default_orderby = \"colour+\"\n").unwrap();

        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Invalid { key, .. }) if key == "default_orderby"
        ));
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load(dir.path()).unwrap();
        config.settings.set("date_format", "%d.%m.%Y").unwrap();
        config.save().unwrap();

        let reloaded = Config::load(dir.path()).unwrap();
        assert_eq!(reloaded.settings.date_format, "%d.%m.%Y");
        assert_eq!(reloaded.path(), dir.path().join("config.toml"));
    }
}
