//! Global configuration management for Uplift.
//!
//! The global configuration lives in a TOML file outside any project:
//!
//! - **Unix/macOS**: `~/.uplift/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\uplift\config.toml`
//!
//! A missing file is not an error; every field has a default.
//!
//! ```toml
//! [update]
//! repo_owner = "uplift-dev"
//! repo_name = "uplift"
//! check_interval = 86400
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use uplift_cli::config::GlobalConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut config = GlobalConfig::load().await?;
//! config.update.check_interval = 3600;
//! config.save().await?;
//! # Ok(())
//! # }
//! ```

use super::UpdateConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Global configuration structure for Uplift.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Update discovery, download and install settings.
    #[serde(default)]
    pub update: UpdateConfig,
}

impl GlobalConfig {
    /// Load global configuration from the default platform-specific location.
    ///
    /// Returns the default configuration when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The default path cannot be determined
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML syntax
    pub async fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_or_default(&path).await
    }

    /// Load global configuration from an optional path.
    ///
    /// If a path is provided, loads from that path. Otherwise, loads from the
    /// default location.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_or_default(&path).await,
            None => Self::load().await,
        }
    }

    async fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path).await
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load global configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Save global configuration to the default platform-specific location.
    pub async fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path).await
    }

    /// Save global configuration to a specific file path.
    ///
    /// Creates parent directories as needed and writes pretty-formatted TOML.
    /// On Unix the file is restricted to the owner.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write global config to {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read permissions for {}", path.display()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).await.with_context(|| {
                format!("Failed to set permissions on {}", path.display())
            })?;
        }

        Ok(())
    }

    /// Directory that holds the configuration and, by default, the preferences file.
    ///
    /// - **Windows**: `%LOCALAPPDATA%\uplift`
    /// - **Unix/macOS**: `~/.uplift`
    pub fn default_dir() -> Result<PathBuf> {
        let dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("uplift")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".uplift")
        };
        Ok(dir)
    }

    /// Get the default file path for global configuration.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::default_dir()?.join("config.toml"))
    }

    /// Preferences file location: the configured path, or `preferences.json`
    /// beside `config_path` (or the default configuration directory).
    pub fn preferences_path(&self, config_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = &self.update.preferences_path {
            return Ok(path.clone());
        }
        let dir = match config_path.and_then(Path::parent) {
            Some(parent) => parent.to_path_buf(),
            None => Self::default_dir()?,
        };
        Ok(dir.join("preferences.json"))
    }
}
