//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! API base URL, the last used username (to prefill the login form), and
//! the trust posture for offline startup.
//!
//! Configuration is stored at `~/.config/opsdeck/config.json`; the
//! `OPSDECK_API_URL` environment variable overrides the configured base URL.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "opsdeck";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment override for the API base URL
const API_URL_ENV: &str = "OPSDECK_API_URL";

const DEFAULT_API_BASE_URL: &str = "https://api.opsdeck.app";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_offline_trust() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub last_username: Option<String>,
    /// Keep a persisted session usable when the auth service is
    /// unreachable at startup. See `SessionPolicy::offline_trust`.
    #[serde(default = "default_offline_trust")]
    pub offline_trust: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            last_username: None,
            offline_trust: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        Ok(config.with_env_override(std::env::var(API_URL_ENV).ok()))
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

    fn with_env_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            self.api_base_url = url;
        }
        self
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
