//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL and the last used email address.
//!
//! Configuration is stored at `~/.config/jobdeck/config.json`. The
//! `JOBDECK_API_URL` environment variable overrides the stored base URL.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
const APP_NAME: &str = "jobdeck";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
const API_URL_ENV: &str = "JOBDECK_API_URL";

/// Used when neither the environment nor the config file names a server
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Resolve the API base URL: environment beats the config file,
    /// falling back to a local development server.
    pub fn api_base_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }
}
