//! Persisted user preferences consumed by the update checker.
//!
//! The update subsystem only needs three values from the host's preference
//! store: when the last check ran, which version the user chose to skip, and
//! whether automatic checks are enabled at all. [`PreferenceStore`] is the
//! boundary; two implementations are provided:
//!
//! - [`FilePreferenceStore`] - a small JSON file, the default for the CLI
//! - [`MemoryPreferenceStore`] - in-process storage for embedding and tests
//!
//! # File Format
//!
//! ```json
//! {
//!   "last_update_check": 1760000000000,
//!   "skip_version": "v1.4.0",
//!   "update_check_enabled": true
//! }
//! ```

use crate::core::UpdateError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::debug;

/// Preference values owned by the host and read/written by the update checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Unix time in milliseconds of the last completed release check; `0` if never.
    #[serde(default)]
    pub last_update_check: i64,
    /// Release tag the user dismissed permanently.
    #[serde(default)]
    pub skip_version: Option<String>,
    /// Whether automatic checks on startup are allowed.
    #[serde(default = "default_update_check_enabled")]
    pub update_check_enabled: bool,
}

fn default_update_check_enabled() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            last_update_check: 0,
            skip_version: None,
            update_check_enabled: default_update_check_enabled(),
        }
    }
}

/// Storage for [`Preferences`].
///
/// Implementations must return [`Preferences::default`] when nothing has been
/// stored yet.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read the current preferences.
    async fn load(&self) -> Result<Preferences, UpdateError>;

    /// Replace the stored preferences.
    async fn store(&self, preferences: &Preferences) -> Result<(), UpdateError>;
}

/// JSON-file backed preference store.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    /// Create a store backed by the file at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn load(&self) -> Result<Preferences, UpdateError> {
        if !self.path.exists() {
            debug!("No preferences file at {}", self.path.display());
            return Ok(Preferences::default());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| UpdateError::file_system("read preferences", &self.path, &e))?;

        serde_json::from_str(&content).map_err(|e| UpdateError::PreferenceError {
            message: format!("Failed to parse {}: {e}", self.path.display()),
        })
    }

    async fn store(&self, preferences: &Preferences) -> Result<(), UpdateError> {
        let content = serde_json::to_string_pretty(preferences).map_err(|e| {
            UpdateError::PreferenceError {
                message: format!("Failed to serialize preferences: {e}"),
            }
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| UpdateError::file_system("create directory", parent, &e))?;
        }

        fs::write(&self.path, content)
            .await
            .map_err(|e| UpdateError::file_system("write preferences", &self.path, &e))?;

        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}

/// In-memory preference store.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    inner: Mutex<Preferences>,
}

impl MemoryPreferenceStore {
    /// Create a store holding default preferences.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `preferences`.
    pub fn with_preferences(preferences: Preferences) -> Self {
        Self {
            inner: Mutex::new(preferences),
        }
    }

    /// Copy of the current values.
    pub fn snapshot(&self) -> Preferences {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn load(&self) -> Result<Preferences, UpdateError> {
        Ok(self.snapshot())
    }

    async fn store(&self, preferences: &Preferences) -> Result<(), UpdateError> {
        *self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
            preferences.clone();
        Ok(())
    }
}
