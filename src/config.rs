//! Configuration loading and management
//!
//! Settings live in `~/.ecolens/config.toml`; every field has a default
//! so a missing file is not an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the local store database. Defaults to
    /// `~/.ecolens/ecolens.db`.
    pub store_path: Option<PathBuf>,

    /// How many leaderboard rows to fetch and display.
    pub leaderboard_limit: usize,

    /// Locally remembered signed-in identity; absent means anonymous.
    pub identity: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            leaderboard_limit: 50,
            identity: None,
        }
    }
}

impl Config {
    /// Global configuration directory (`~/.ecolens`).
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ecolens")
    }

    /// Default config file path (`~/.ecolens/config.toml`).
    pub fn default_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load from the given path, or the default location. A missing
    /// file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Resolved store database path.
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("ecolens.db"))
    }

    /// Write a starter config file. Refuses to overwrite unless `force`.
    pub fn write_starter(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!(
                "Config already exists at {} (use --force to overwrite)",
                path.display()
            );
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let starter = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;
        std::fs::write(path, starter)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}
