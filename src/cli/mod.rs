//! Command-line interface for Uplift.
//!
//! The `uplift` binary drives the update flow from a terminal: discover a newer
//! release, download and validate its package, and hand it to the installer.
//!
//! # Commands
//!
//! - `check` - Look for a newer stable release
//! - `download` - Download and validate a package from a URL
//! - `update` - Check, then download the newer package if one exists
//! - `skip` - Stop offering a specific version (or forget a skip)
//! - `status` - Show configuration and stored preferences
//! - `checks` - Enable or disable automatic update checks
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Suppress logging
//! - `--config <path>` - Use a different configuration file
//! - `--no-progress` - Hide progress bars
//!
//! # Examples
//!
//! ```bash
//! uplift check
//! uplift check --if-due
//! uplift update --install
//! uplift download https://example.com/uplift-1.3.0.zip
//! uplift skip v1.3.0
//! uplift --no-progress status
//! ```

mod check;
mod checks;
mod common;
mod download;
mod skip;
mod status;
mod update;

use crate::utils::progress::NO_PROGRESS_ENV;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime configuration for CLI execution.
///
/// Holds the settings derived from global flags so tests and embedders can
/// run commands without parsing arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive. `None` disables logging.
    pub log_level: Option<String>,

    /// Whether to hide progress bars.
    ///
    /// When `true`, sets `UPLIFT_NO_PROGRESS` for the rest of the process.
    pub no_progress: bool,

    /// Configuration file to use instead of `~/.uplift/config.toml`.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a new CLI configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply this configuration to the process environment.
    ///
    /// Should be called once, before any task is spawned.
    pub fn apply_to_env(&self) {
        if self.no_progress {
            // SAFETY: called once from `execute_with_config` before any task is
            // spawned; no other thread reads or writes the environment yet.
            unsafe {
                std::env::set_var(NO_PROGRESS_ENV, "1");
            }
        }
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the default level but not over
    /// `--verbose` or `--quiet`.
    pub fn init_logging(&self, explicit: bool) {
        let filter = match &self.log_level {
            None => EnvFilter::new("off"),
            Some(level) if explicit => EnvFilter::new(level),
            Some(level) => {
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
            }
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Main CLI application structure for Uplift.
#[derive(Parser, Debug)]
#[command(
    name = "uplift",
    about = "Uplift - discover, download and install application updates",
    version,
    long_about = "Uplift checks a release feed for newer stable versions, downloads and validates \
                  the package, and launches the platform installer."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hide progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands for the Uplift CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether a newer release is available
    Check(check::CheckCommand),

    /// Download and validate a package
    Download(download::DownloadCommand),

    /// Check for a newer release and download it
    Update(update::UpdateCommand),

    /// Stop offering a version, or forget a skipped version
    Skip(skip::SkipCommand),

    /// Show configuration and update preferences
    Status(status::StatusCommand),

    /// Enable or disable automatic update checks
    Checks(checks::ChecksCommand),
}

impl Cli {
    /// Execute the parsed command with configuration built from the global flags.
    ///
    /// # Errors
    ///
    /// Returns the command's error; `main` renders it with
    /// [`user_friendly_error`](crate::core::user_friendly_error).
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging(self.verbose || self.quiet);
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed CLI arguments.
    ///
    /// - `--verbose` → `debug`
    /// - `--quiet` → no logging
    /// - otherwise → `warn`
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Execute the CLI with a specific configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.apply_to_env();
        let config_path = config.config_path;

        match self.command {
            Commands::Check(cmd) => cmd.execute(config_path).await,
            Commands::Download(cmd) => cmd.execute(config_path).await,
            Commands::Update(cmd) => cmd.execute(config_path).await,
            Commands::Skip(cmd) => cmd.execute(config_path).await,
            Commands::Status(cmd) => cmd.execute(config_path).await,
            Commands::Checks(cmd) => cmd.execute(config_path).await,
        }
    }
}
