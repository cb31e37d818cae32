//! Release selection: deciding whether a newer stable release exists.
//!
//! [`UpdateChecker`] fetches every release from a [`ReleaseSource`], keeps the
//! published, non-prerelease ones with strict `v?X.Y.Z` tags, picks the newest
//! and compares it to the running version. A release the user chose to skip is
//! never offered again, and the time of each successful check is recorded in the
//! [`PreferenceStore`] so startup checks can be rate limited.
//!
//! Checks are best-effort. Network, HTTP and parse failures are logged and
//! reported as "no update available"; they never reach the caller.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use uplift_cli::checker::UpdateChecker;
//! use uplift_cli::prefs::MemoryPreferenceStore;
//! use uplift_cli::release::GitHubReleaseSource;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let source = GitHubReleaseSource::new(
//!     "https://api.github.com",
//!     Duration::from_secs(30),
//!     Duration::from_secs(30),
//! )?;
//! let checker = UpdateChecker::new(
//!     Arc::new(source),
//!     Arc::new(MemoryPreferenceStore::new()),
//!     "uplift-dev",
//!     "uplift",
//! );
//!
//! if let Some(info) = checker.check_for_update(env!("CARGO_PKG_VERSION")).await {
//!     println!("Update available: {}", info.available_version);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::UpdateConfig;
use crate::constants::{DEFAULT_PACKAGE_EXTENSION, UPDATE_CHECK_INTERVAL_SECS};
use crate::core::UpdateError;
use crate::prefs::{PreferenceStore, Preferences};
use crate::release::{Release, ReleaseSource};
use crate::version::{UpdateStatus, Version, VersionComparator};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where an available update can be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    /// The release carries a package asset that can be downloaded directly.
    DirectArtifact(String),
    /// No package asset; the user has to visit the release page.
    ReleasePageOnly(String),
}

impl DownloadTarget {
    /// The URL of this target.
    pub fn url(&self) -> &str {
        match self {
            Self::DirectArtifact(url) | Self::ReleasePageOnly(url) => url,
        }
    }
}

/// Description of an available update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    /// Tag of the newer release, e.g. `v1.3.0`.
    pub available_version: String,
    /// Version string of the running application.
    pub current_version: String,
    /// Package asset or release page.
    pub download: DownloadTarget,
    /// Web page describing the release.
    pub release_page_url: String,
    /// Release notes, if the publisher wrote any.
    pub changelog: Option<String>,
}

impl UpdateInfo {
    /// URL to download from, or the release page when no package is attached.
    pub fn download_url(&self) -> &str {
        self.download.url()
    }

    /// Whether [`download_url`](Self::download_url) points at a package that
    /// the download manager can fetch.
    pub const fn can_auto_download(&self) -> bool {
        matches!(self.download, DownloadTarget::DirectArtifact(_))
    }
}

/// Finds the newest eligible release and decides whether to offer it.
pub struct UpdateChecker {
    source: Arc<dyn ReleaseSource>,
    prefs: Arc<dyn PreferenceStore>,
    owner: String,
    repo: String,
    package_extension: String,
    check_interval: Duration,
}

impl UpdateChecker {
    /// Create a checker for `owner/repo` with the default package extension and interval.
    pub fn new(
        source: Arc<dyn ReleaseSource>,
        prefs: Arc<dyn PreferenceStore>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            source,
            prefs,
            owner: owner.into(),
            repo: repo.into(),
            package_extension: DEFAULT_PACKAGE_EXTENSION.to_string(),
            check_interval: Duration::from_secs(UPDATE_CHECK_INTERVAL_SECS),
        }
    }

    /// Create a checker using the repository, extension and interval from `config`.
    pub fn from_config(
        config: &UpdateConfig,
        source: Arc<dyn ReleaseSource>,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self::new(source, prefs, &config.repo_owner, &config.repo_name)
            .with_package_extension(&config.package_extension)
            .with_check_interval(config.check_interval())
    }

    /// Asset name suffix that marks the installable package.
    #[must_use]
    pub fn with_package_extension(mut self, extension: impl Into<String>) -> Self {
        self.package_extension = extension.into();
        self
    }

    /// Minimum time between startup checks.
    #[must_use]
    pub const fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Look for a release newer than `current_version`.
    ///
    /// Returns `None` when no eligible release exists, the newest one is not
    /// newer, the user skipped it, or the check failed. A failure to read the
    /// preference store counts as a failed check: nothing is recorded or offered.
    pub async fn check_for_update(&self, current_version: &str) -> Option<UpdateInfo> {
        let releases = match self.source.list_releases(&self.owner, &self.repo).await {
            Ok(releases) => releases,
            Err(e) => {
                warn!("Update check for {}/{} failed: {e}", self.owner, self.repo);
                return None;
            }
        };

        let Some(newest) = newest_stable_release(releases) else {
            debug!("No stable releases found for {}/{}", self.owner, self.repo);
            return None;
        };

        // Preferences that could not be read are never written back.
        let prefs = match self.prefs.load().await {
            Ok(mut prefs) => {
                prefs.last_update_check = Utc::now().timestamp_millis();
                self.store_prefs(&prefs).await;
                Some(prefs)
            }
            Err(e) => {
                warn!("Failed to read update preferences, not recording this check: {e}");
                None
            }
        };

        if VersionComparator::compare(current_version, &newest.tag) == UpdateStatus::UpToDate {
            debug!("Running version {current_version} is up to date (latest {})", newest.tag);
            return None;
        }

        let Some(prefs) = prefs else {
            warn!(
                "Update {} found, but the skipped version is unknown; not offering it",
                newest.tag
            );
            return None;
        };
        if prefs.skip_version.as_deref() == Some(newest.tag.as_str()) {
            info!("Update {} is available but was skipped by the user", newest.tag);
            return None;
        }

        let download = newest
            .assets
            .iter()
            .find(|asset| asset.name.ends_with(&self.package_extension))
            .map_or_else(
                || DownloadTarget::ReleasePageOnly(newest.release_page_url.clone()),
                |asset| DownloadTarget::DirectArtifact(asset.download_url.clone()),
            );

        info!("Update available: {current_version} -> {}", newest.tag);

        Some(UpdateInfo {
            available_version: newest.tag,
            current_version: current_version.to_string(),
            download,
            release_page_url: newest.release_page_url,
            changelog: newest.notes,
        })
    }

    /// Whether an automatic check is due now.
    pub async fn should_check_on_startup(&self) -> bool {
        self.should_check_at(Utc::now().timestamp_millis()).await
    }

    /// Whether an automatic check is due at `now_ms` (Unix milliseconds).
    ///
    /// True when checks are enabled and at least the configured interval has
    /// elapsed since the last recorded check.
    pub async fn should_check_at(&self, now_ms: i64) -> bool {
        let prefs = self.load_prefs().await;
        if !prefs.update_check_enabled {
            return false;
        }
        let interval_ms = i64::try_from(self.check_interval.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(prefs.last_update_check) >= interval_ms
    }

    /// Never offer `version` again.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference store cannot be read or written.
    pub async fn mark_version_skipped(&self, version: &str) -> Result<(), UpdateError> {
        let mut prefs = self.prefs.load().await?;
        prefs.skip_version = Some(version.to_string());
        self.prefs.store(&prefs).await?;
        info!("Skipping version {version}");
        Ok(())
    }

    /// Forget a previously skipped version.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference store cannot be read or written.
    pub async fn clear_skipped_version(&self) -> Result<(), UpdateError> {
        let mut prefs = self.prefs.load().await?;
        if prefs.skip_version.take().is_some() {
            self.prefs.store(&prefs).await?;
        }
        Ok(())
    }

    /// Enable or disable automatic update checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference store cannot be read or written.
    pub async fn set_update_check_enabled(&self, enabled: bool) -> Result<(), UpdateError> {
        let mut prefs = self.prefs.load().await?;
        prefs.update_check_enabled = enabled;
        self.prefs.store(&prefs).await
    }

    /// Current preference values.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference store cannot be read.
    pub async fn preferences(&self) -> Result<Preferences, UpdateError> {
        self.prefs.load().await
    }

    async fn load_prefs(&self) -> Preferences {
        self.prefs.load().await.unwrap_or_else(|e| {
            warn!("Failed to read update preferences, using defaults: {e}");
            Preferences::default()
        })
    }

    async fn store_prefs(&self, prefs: &Preferences) {
        if let Err(e) = self.prefs.store(prefs).await {
            warn!("Failed to record update check time: {e}");
        }
    }
}

/// Newest published, non-prerelease release with a strict version tag.
fn newest_stable_release(releases: Vec<Release>) -> Option<Release> {
    releases
        .into_iter()
        .filter(|r| !r.is_draft && !r.is_prerelease)
        .filter(|r| VersionComparator::is_strict_release_tag(&r.tag))
        .max_by_key(|r| Version::parse(&r.tag))
}
