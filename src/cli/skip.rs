use super::common::CommandContext;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Stop offering a release, or forget the skipped release.
///
/// ```bash
/// uplift skip v1.3.0
/// uplift skip --clear
/// ```
#[derive(Args, Debug)]
pub struct SkipCommand {
    /// Release tag to skip, exactly as published (e.g. `v1.3.0`)
    #[arg(required_unless_present = "clear", conflicts_with = "clear")]
    version: Option<String>,

    /// Forget the skipped version
    #[arg(long)]
    clear: bool,
}

impl SkipCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let ctx = CommandContext::load(config_path).await?;
        let checker = ctx.preference_checker()?;

        match self.version {
            Some(version) if !self.clear => {
                checker
                    .mark_version_skipped(&version)
                    .await
                    .with_context(|| format!("Failed to skip {version}"))?;
                println!("{}", format!("Version {version} will not be offered again").green());
            }
            _ => {
                checker.clear_skipped_version().await.context("Failed to clear skipped version")?;
                println!("{}", "Skipped version cleared".green());
            }
        }
        Ok(())
    }
}
