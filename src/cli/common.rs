//! Wiring shared by the CLI commands: configuration, collaborators and the
//! interactive download loop.

use crate::checker::{UpdateChecker, UpdateInfo};
use crate::config::GlobalConfig;
use crate::core::UpdateError;
use crate::download::{DownloadManager, DownloadState};
use crate::install::{CommandInstaller, InstallGateway};
use crate::prefs::FilePreferenceStore;
use crate::release::{FixedReleaseSource, GitHubReleaseSource, ReleaseSource};
use crate::utils::ProgressBar;
use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Loaded configuration plus the path it came from.
pub struct CommandContext {
    pub config: GlobalConfig,
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    pub async fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config = GlobalConfig::load_with_optional(config_path.clone())
            .await
            .context("Failed to load configuration")?;
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn preferences_path(&self) -> Result<PathBuf> {
        self.config.preferences_path(self.config_path.as_deref())
    }

    pub fn preference_store(&self) -> Result<FilePreferenceStore> {
        Ok(FilePreferenceStore::new(self.preferences_path()?))
    }

    async fn release_source(&self) -> Result<Arc<dyn ReleaseSource>> {
        let update = &self.config.update;
        if let Some(path) = &update.fixed_release_file {
            debug!("Using fixed release from {}", path.display());
            return Ok(Arc::new(FixedReleaseSource::from_file(path).await?));
        }
        Ok(Arc::new(GitHubReleaseSource::new(
            &update.api_base_url,
            update.connect_timeout(),
            update.read_timeout(),
        )?))
    }

    pub async fn checker(&self) -> Result<UpdateChecker> {
        let source = self.release_source().await?;
        let prefs = Arc::new(self.preference_store()?);
        Ok(UpdateChecker::from_config(&self.config.update, source, prefs))
    }

    /// Checker for commands that only read or write preferences. It has no
    /// releases, so a broken release source cannot fail those commands.
    pub fn preference_checker(&self) -> Result<UpdateChecker> {
        let prefs = Arc::new(self.preference_store()?);
        let source = Arc::new(FixedReleaseSource::new(Vec::new()));
        Ok(UpdateChecker::from_config(&self.config.update, source, prefs))
    }

    pub fn download_manager(&self) -> Result<DownloadManager> {
        Ok(DownloadManager::from_config(&self.config.update)?)
    }

    pub fn installer(&self) -> CommandInstaller {
        CommandInstaller::from_config(&self.config.update)
    }
}

/// Version string used when `--current` is not given.
pub fn running_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub fn print_update(info: &UpdateInfo) {
    println!(
        "{}",
        format!("Update available: {} -> {}", info.current_version, info.available_version)
            .green()
    );
    if let Some(notes) = info.changelog.as_deref().filter(|n| !n.trim().is_empty()) {
        println!("\n{}\n{}\n", "Release notes:".bold(), notes.trim());
    }
    println!("Release page: {}", info.release_page_url);
}

/// Run a download to completion, showing progress. Ctrl-C cancels the transfer.
///
/// Returns the artifact path when the download completed, `None` when it was
/// cancelled.
pub async fn run_download(manager: &DownloadManager, url: &str) -> Result<Option<PathBuf>> {
    manager.download(url)?;

    let label = url.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or("package");
    let progress = ProgressBar::new_download(label);
    let mut rx = manager.subscribe();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut cancel_requested = false;

    let outcome = loop {
        let state = rx.borrow_and_update().clone();
        match state {
            DownloadState::Downloading { progress: percent } => progress.set_percent(percent),
            terminal if terminal.is_terminal() => break terminal,
            _ => {}
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break manager.state();
                }
            }
            _ = &mut ctrl_c, if !cancel_requested => {
                cancel_requested = true;
                manager.cancel();
            }
        }
    };

    match outcome {
        DownloadState::Complete { artifact_path } => {
            progress.finish_with_message("done");
            println!("{}", format!("Package ready: {}", artifact_path.display()).green());
            Ok(Some(artifact_path))
        }
        DownloadState::Cancelled => {
            progress.abandon_with_message("cancelled");
            println!("{}", "Download cancelled".yellow());
            Ok(None)
        }
        DownloadState::Error { message } => {
            progress.abandon_with_message("failed");
            match manager.last_error() {
                Some(error) => Err(anyhow::Error::new(error).context("Download failed")),
                None => Err(anyhow!("Download failed: {message}")),
            }
        }
        other => Err(anyhow!("Download ended in unexpected state: {other}")),
    }
}

/// Launch the installer for a validated package.
pub async fn install_package(installer: &dyn InstallGateway, path: &Path) -> Result<()> {
    if !installer.can_install_packages() {
        installer.request_install_permission();
        return Err(UpdateError::InstallNotPermitted.into());
    }

    installer.install(path).await.map_err(|reason| UpdateError::InstallFailed {
        reason,
    })?;

    println!("{}", "Installer started. Close the application to finish updating.".green());
    Ok(())
}
