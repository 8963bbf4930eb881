//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend URL, the last used email and the timing of the
//! streaming reveal.
//!
//! Configuration is stored at `~/.config/codesage/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_API_URL;
use crate::reveal::RevealTiming;

/// Application name used for config/data directory paths
const APP_NAME: &str = "codesage";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the backend URL
pub const API_URL_ENV: &str = "CODESAGE_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
    pub remember_credentials: bool,
    pub reveal_divisor: u64,
    pub reveal_min_delay_ms: u64,
    pub reveal_max_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let timing = RevealTiming::default();
        Self {
            api_url: None,
            last_email: None,
            remember_credentials: false,
            reveal_divisor: timing.divisor,
            reveal_min_delay_ms: timing.min_delay_ms,
            reveal_max_delay_ms: timing.max_delay_ms,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Read the config at `path`, or the defaults when there is none
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding persisted session and review state
    pub fn data_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Backend URL: environment first, then config, then the default
    pub fn api_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn reveal_timing(&self) -> RevealTiming {
        RevealTiming {
            divisor: self.reveal_divisor,
            min_delay_ms: self.reveal_min_delay_ms,
            max_delay_ms: self.reveal_max_delay_ms,
        }
    }
}
