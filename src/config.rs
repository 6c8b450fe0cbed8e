//! Configuration file support for schedule-watcher.
//!
//! This module provides functionality for loading and saving user preferences
//! from a TOML configuration file.

use crate::api::SCHEDULE_URL;
use crate::error::{AppError, Result};
use crate::pipeline::{PAGE_SIZE, SortDirection, SortKey, ViewState};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// User configuration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Schedule feed returning a JSON array of episodes
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Timeout for the feed request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Episodes per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Initial sort key: "date", "episodeName" or "showName"
    #[serde(default)]
    pub sort_key: SortKey,

    /// Initial sort direction: "asc" or "desc"
    #[serde(default)]
    pub sort_direction: SortDirection,

    /// Jump back to page 1 whenever a filter changes
    #[serde(default)]
    pub reset_page_on_filter_change: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_feed_url() -> String {
    SCHEDULE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    PAGE_SIZE
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            feed_url: default_feed_url(),
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
            sort_key: SortKey::default(),
            sort_direction: SortDirection::default(),
            reset_page_on_filter_change: false,
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/schedule-watcher/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("schedule-watcher");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(AppError::Config("page_size must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save config to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::get_config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Create a default config file if one doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            let config = Self::new();
            config.save()?;
        }

        Ok(path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// View state the UI starts with.
    pub fn initial_view(&self) -> ViewState {
        ViewState {
            page: 1,
            sort_key: self.sort_key,
            sort_direction: self.sort_direction,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_has_defaults() {
        let config = Config::new();
        assert_eq!(config.feed_url, "https://api.tvmaze.com/schedule/full");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.page_size, 120);
        assert_eq!(config.sort_key, SortKey::Date);
        assert_eq!(config.sort_direction, SortDirection::Asc);
        assert!(!config.reset_page_on_filter_change);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            sort_key: SortKey::ShowName,
            sort_direction: SortDirection::Desc,
            page_size: 60,
            ..Config::new()
        };

        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("sort_key = \"showName\""));
        assert!(toml_str.contains("sort_direction = \"desc\""));
        assert!(toml_str.contains("page_size = 60"));
        assert!(toml_str.contains("reset_page_on_filter_change = false"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            feed_url = "http://localhost:8080/schedule"
            request_timeout_secs = 5
            page_size = 24
            sort_key = "episodeName"
            sort_direction = "desc"
            reset_page_on_filter_change = true
        "#;

        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.feed_url, "http://localhost:8080/schedule");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.page_size, 24);
        assert_eq!(config.sort_key, SortKey::EpisodeName);
        assert_eq!(config.sort_direction, SortDirection::Desc);
        assert!(config.reset_page_on_filter_change);
    }

    #[test]
    fn test_config_partial_deserialization() {
        // Only specify some fields, rest should use defaults
        let toml_str = r#"
            sort_direction = "desc"
        "#;

        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.sort_direction, SortDirection::Desc);
        assert_eq!(config.page_size, 120); // default
        assert_eq!(config.sort_key, SortKey::Date); // default
    }

    #[test]
    fn test_config_rejects_zero_page_size() {
        let err = Config::from_toml("page_size = 0").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_config_rejects_unknown_sort_key() {
        let err = Config::from_toml("sort_key = \"rating\"").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_initial_view() {
        let config = Config {
            page_size: 10,
            sort_key: SortKey::ShowName,
            ..Config::new()
        };
        let view = config.initial_view();
        assert_eq!(view.page, 1);
        assert_eq!(view.page_size, 10);
        assert_eq!(view.sort_key, SortKey::ShowName);
    }
}
