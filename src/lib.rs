//! Uplift - self-update subsystem for desktop applications
//!
//! Uplift answers three questions for a host application: is there a newer
//! stable release, can its package be downloaded and trusted, and can it be
//! handed to the platform installer.
//!
//! # Architecture Overview
//!
//! ```text
//! UpdateChecker ──▶ Option<UpdateInfo> ──▶ DownloadManager ──▶ Complete{path} ──▶ InstallGateway
//!      │                                         │
//!  ReleaseSource                          ArtifactValidator
//!  PreferenceStore                        PackageInspector
//! ```
//!
//! Collaborators with side effects sit behind traits so hosts can substitute
//! their own: [`release::ReleaseSource`], [`prefs::PreferenceStore`],
//! [`download::PackageInspector`] and [`install::InstallGateway`].
//!
//! # Core Modules
//!
//! ## Update Flow
//! - [`version`] - Version parsing, ordering and strict release tags
//! - [`checker`] - Selecting the newest eligible release
//! - [`download`] - Single-flight download with progress, cancellation and validation
//! - [`install`] - Launching the platform installer
//!
//! ## Collaborators
//! - [`release`] - Release metadata (GitHub API or a fixed list)
//! - [`prefs`] - Persisted check time, skipped version and enable toggle
//!
//! ## Supporting Modules
//! - [`cli`] - The `uplift` command-line interface
//! - [`config`] - `~/.uplift/config.toml`
//! - [`constants`] - Timeouts, thresholds and defaults
//! - [`core`] - Error types and user-facing error rendering
//! - [`utils`] - Progress display
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use uplift_cli::checker::UpdateChecker;
//! use uplift_cli::config::GlobalConfig;
//! use uplift_cli::download::{DownloadManager, DownloadState};
//! use uplift_cli::install::{CommandInstaller, InstallGateway};
//! use uplift_cli::prefs::FilePreferenceStore;
//! use uplift_cli::release::GitHubReleaseSource;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GlobalConfig::load().await?;
//! let update = &config.update;
//!
//! let source = GitHubReleaseSource::new(
//!     &update.api_base_url,
//!     update.connect_timeout(),
//!     update.read_timeout(),
//! )?;
//! let prefs = FilePreferenceStore::new(config.preferences_path(None)?);
//! let checker = UpdateChecker::from_config(update, Arc::new(source), Arc::new(prefs));
//!
//! if let Some(info) = checker.check_for_update(env!("CARGO_PKG_VERSION")).await {
//!     if info.can_auto_download() {
//!         let manager = DownloadManager::from_config(update)?;
//!         manager.download(info.download_url())?;
//!
//!         if let DownloadState::Complete { artifact_path } = manager.wait_for_terminal().await {
//!             let installer = CommandInstaller::from_config(update);
//!             if installer.can_install_packages() {
//!                 installer.install(&artifact_path).await.map_err(anyhow::Error::msg)?;
//!             } else {
//!                 installer.request_install_permission();
//!             }
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Update flow
pub mod checker;
pub mod download;
pub mod install;
pub mod version;

// Collaborators
pub mod prefs;
pub mod release;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
