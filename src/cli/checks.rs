use super::common::CommandContext;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Toggle {
    Enable,
    Disable,
}

/// Enable or disable automatic update checks (`uplift check --if-due`).
#[derive(Args, Debug)]
pub struct ChecksCommand {
    #[arg(value_enum)]
    toggle: Toggle,
}

impl ChecksCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let ctx = CommandContext::load(config_path).await?;
        let checker = ctx.preference_checker()?;
        let enabled = self.toggle == Toggle::Enable;

        checker
            .set_update_check_enabled(enabled)
            .await
            .context("Failed to update preferences")?;

        if enabled {
            println!("{}", "Automatic update checks enabled".green());
        } else {
            println!("{}", "Automatic update checks disabled".yellow());
        }
        Ok(())
    }
}
