use crate::constants::{
    ARTIFACT_FILE_STEM, CONNECT_TIMEOUT, DEFAULT_API_BASE_URL, DEFAULT_APP_IDENTITY,
    DEFAULT_PACKAGE_EXTENSION, DEFAULT_REPO_NAME, DEFAULT_REPO_OWNER, MIN_PACKAGE_SIZE,
    READ_TIMEOUT, UPDATE_CHECK_INTERVAL_SECS, WRITE_TIMEOUT,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration settings for Uplift update behavior.
///
/// `UpdateConfig` defines where releases are discovered, what counts as an
/// installable package, and how long network and disk operations may take.
///
/// # Configuration Categories
///
/// ## Release Discovery
/// - **Repository**: `repo_owner` / `repo_name` on `api_base_url`
/// - **Check Interval**: minimum time between automatic checks
/// - **Fixed Release**: `fixed_release_file` bypasses the network entirely
///
/// ## Package Validation
/// - **Extension**: which release asset is the package
/// - **Identity**: the identifier a package must declare to be accepted
/// - **Minimum Size**: rejects truncated downloads and error pages
///
/// ## Installation
/// - **Installer Command**: program launched with the validated package
///
/// # TOML Example
/// ```toml
/// [update]
/// repo_owner = "uplift-dev"
/// repo_name = "uplift"
/// package_extension = ".zip"
/// app_identity = "dev.uplift.app"
/// check_interval = 86400
/// min_package_size = 1048576
/// install_command = ["xdg-open", "{path}"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Owner of the repository whose releases are queried.
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// Name of the repository whose releases are queried.
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// Base URL of the release metadata API.
    ///
    /// Overridable so tests and mirrors can point at a different host.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Asset name suffix that identifies the installable package.
    #[serde(default = "default_package_extension")]
    pub package_extension: String,

    /// Identifier a downloaded package must declare in its manifest.
    #[serde(default = "default_app_identity")]
    pub app_identity: String,

    /// Seconds between automatic update checks.
    ///
    /// # Default: `86400` (24 hours)
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,

    /// Smallest artifact size, in bytes, accepted as a real package.
    ///
    /// # Default: `1048576` (1 MiB)
    #[serde(default = "default_min_package_size")]
    pub min_package_size: u64,

    /// Directory the artifact is downloaded to.
    ///
    /// Defaults to the platform cache directory (`~/.cache/uplift` on Linux).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,

    /// Location of the preferences file.
    ///
    /// Defaults to `preferences.json` next to the configuration file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences_path: Option<PathBuf>,

    /// Seconds allowed for establishing a connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Seconds allowed between two reads of a response body.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Seconds allowed for writing one chunk to disk.
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,

    /// Installer command; `{path}` is replaced by the artifact path.
    ///
    /// When unset a platform default is used (`msiexec`, `open` or `xdg-open`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_command: Option<Vec<String>>,

    /// Whether this installation may launch the installer at all.
    ///
    /// Managed installs (package managers, read-only images) set this to `false`.
    #[serde(default = "default_installer_enabled")]
    pub installer_enabled: bool,

    /// JSON file holding a single release; when set, no network request is made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_release_file: Option<PathBuf>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            api_base_url: default_api_base_url(),
            package_extension: default_package_extension(),
            app_identity: default_app_identity(),
            check_interval: default_check_interval(),
            min_package_size: default_min_package_size(),
            download_dir: None,
            preferences_path: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            write_timeout_secs: default_write_timeout_secs(),
            install_command: None,
            installer_enabled: default_installer_enabled(),
            fixed_release_file: None,
        }
    }
}

fn default_repo_owner() -> String {
    DEFAULT_REPO_OWNER.to_string()
}

fn default_repo_name() -> String {
    DEFAULT_REPO_NAME.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_package_extension() -> String {
    DEFAULT_PACKAGE_EXTENSION.to_string()
}

fn default_app_identity() -> String {
    DEFAULT_APP_IDENTITY.to_string()
}

const fn default_check_interval() -> u64 {
    UPDATE_CHECK_INTERVAL_SECS
}

const fn default_min_package_size() -> u64 {
    MIN_PACKAGE_SIZE
}

const fn default_connect_timeout_secs() -> u64 {
    CONNECT_TIMEOUT.as_secs()
}

const fn default_read_timeout_secs() -> u64 {
    READ_TIMEOUT.as_secs()
}

const fn default_write_timeout_secs() -> u64 {
    WRITE_TIMEOUT.as_secs()
}

const fn default_installer_enabled() -> bool {
    true
}

impl UpdateConfig {
    /// Create an `UpdateConfig` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory downloads are written to.
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir().unwrap_or_else(std::env::temp_dir).join("uplift")
        })
    }

    /// Fixed path of the downloaded artifact, e.g. `~/.cache/uplift/update.zip`.
    pub fn artifact_path(&self) -> PathBuf {
        self.resolved_download_dir()
            .join(format!("{ARTIFACT_FILE_STEM}{}", self.package_extension))
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Read timeout as a [`Duration`].
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Write timeout as a [`Duration`].
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Check interval as a [`Duration`].
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval)
    }
}
