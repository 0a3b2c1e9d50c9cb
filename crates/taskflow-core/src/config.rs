//! Application configuration management.
//!
//! This module handles loading the client configuration: the API
//! base URL and the directory holding persisted client state.
//!
//! Configuration is stored at `~/.config/taskflow/config.json`. The
//! `TASKFLOW_API_URL` environment variable overrides the stored URL.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application name used for config/data directory paths
const APP_NAME: &str = "taskflow";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Storage file name in the data directory
const STORAGE_FILE: &str = "storage.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "TASKFLOW_API_URL";

/// API base URL used when neither the environment nor the config file set one
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(std::env::var(API_URL_ENV).ok());
        debug!(api_url = %config.api_url(), "Configuration loaded");
        Ok(config)
    }

    fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = Some(url);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn storage_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(STORAGE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_url() {
        assert_eq!(Config::default().api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config {
            api_url: Some("http://files.example/api".to_string()),
            data_dir: None,
        };
        config.apply_env(Some("https://tasks.example.com/api".to_string()));
        assert_eq!(config.api_url(), "https://tasks.example.com/api");

        config.apply_env(Some("  ".to_string()));
        assert_eq!(config.api_url(), "https://tasks.example.com/api");
    }

    #[test]
    fn test_explicit_data_dir() {
        let config = Config {
            api_url: None,
            data_dir: Some(PathBuf::from("/tmp/taskflow-test")),
        };
        assert_eq!(
            config.storage_path().unwrap(),
            PathBuf::from("/tmp/taskflow-test/storage.json")
        );
    }
}
