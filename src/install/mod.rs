//! Handing a validated package to the platform installer.
//!
//! [`InstallGateway`] is the boundary between the update subsystem and whatever
//! actually installs software on the host. [`CommandInstaller`] launches an
//! external program with the artifact path; by default:
//!
//! - **Windows**: `msiexec /i {path} /passive`
//! - **macOS**: `open {path}`
//! - **Linux and others**: `xdg-open {path}`
//!
//! The installer is started, not awaited. Once it runs, the host application is
//! expected to exit so the installer can replace it.

use crate::config::UpdateConfig;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tracing::{debug, info, warn};

/// Placeholder replaced by the artifact path in installer command templates.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Platform installer boundary.
#[async_trait]
pub trait InstallGateway: Send + Sync {
    /// Whether this process may launch the installer right now.
    fn can_install_packages(&self) -> bool;

    /// Ask the user or the platform for permission to install. Fire and forget.
    fn request_install_permission(&self);

    /// Launch the installer for the package at `path`.
    ///
    /// # Errors
    ///
    /// Returns a description of why the installer could not be started.
    async fn install(&self, path: &Path) -> Result<(), String>;
}

/// Installer that spawns a configured command.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    command: Vec<String>,
    enabled: bool,
}

impl Default for CommandInstaller {
    fn default() -> Self {
        Self::new(Self::platform_default())
    }
}

impl CommandInstaller {
    /// Installer running `command`; `{path}` in any argument is replaced by the
    /// artifact path. If no argument contains the placeholder the path is appended.
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            enabled: true,
        }
    }

    /// Installer built from the `install_command` and `installer_enabled` settings.
    pub fn from_config(config: &UpdateConfig) -> Self {
        let command = config.install_command.clone().unwrap_or_else(Self::platform_default);
        Self {
            command,
            enabled: config.installer_enabled,
        }
    }

    /// The default installer command for the current platform.
    pub fn platform_default() -> Vec<String> {
        let parts: &[&str] = if cfg!(target_os = "windows") {
            &["msiexec", "/i", PATH_PLACEHOLDER, "/passive"]
        } else if cfg!(target_os = "macos") {
            &["open", PATH_PLACEHOLDER]
        } else {
            &["xdg-open", PATH_PLACEHOLDER]
        };
        parts.iter().map(ToString::to_string).collect()
    }

    /// The command line that would run for `path`.
    pub fn command_line(&self, path: &Path) -> Vec<String> {
        let path = path.display().to_string();
        let mut args: Vec<String> =
            self.command.iter().map(|arg| arg.replace(PATH_PLACEHOLDER, &path)).collect();
        if !self.command.iter().any(|arg| arg.contains(PATH_PLACEHOLDER)) {
            args.push(path);
        }
        args
    }

    fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }
}

#[async_trait]
impl InstallGateway for CommandInstaller {
    fn can_install_packages(&self) -> bool {
        if !self.enabled {
            return false;
        }
        match self.program() {
            Some(program) => which::which(program).is_ok(),
            None => false,
        }
    }

    fn request_install_permission(&self) {
        if !self.enabled {
            warn!(
                "Package installation is disabled; set `update.installer_enabled = true` to allow it"
            );
            return;
        }
        match self.program() {
            Some(program) => warn!(
                "Installer '{program}' was not found on PATH; install it or set `update.install_command`"
            ),
            None => warn!("No installer command configured; set `update.install_command`"),
        }
    }

    async fn install(&self, path: &Path) -> Result<(), String> {
        if !self.enabled {
            return Err("package installation is disabled".to_string());
        }
        if !path.is_file() {
            return Err(format!("package {} does not exist", path.display()));
        }

        let args = self.command_line(path);
        let Some((program, rest)) = args.split_first() else {
            return Err("installer command is empty".to_string());
        };

        debug!("Launching installer: {}", args.join(" "));
        let child = tokio::process::Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("failed to start installer '{program}': {e}"))?;

        info!(
            "Installer started (pid {}) for {}",
            child.id().map_or_else(|| "unknown".to_string(), |id| id.to_string()),
            path.display()
        );
        Ok(())
    }
}
