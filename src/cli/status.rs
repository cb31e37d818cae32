use super::common::{CommandContext, running_version};
use crate::install::InstallGateway;
use anyhow::Result;
use chrono::{Local, TimeZone};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Show configuration and stored update preferences.
#[derive(Args, Debug)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let ctx = CommandContext::load(config_path).await?;
        let update = &ctx.config.update;
        let checker = ctx.preference_checker()?;
        let prefs = checker.preferences().await?;
        let installer = ctx.installer();

        println!("{}", "Uplift status".bold());
        println!("  Running version:   {}", running_version());
        println!("  Repository:        {}/{}", update.repo_owner, update.repo_name);
        println!("  Release API:       {}", update.api_base_url);
        if let Some(path) = &update.fixed_release_file {
            println!("  Fixed release:     {}", path.display());
        }
        println!("  Package:           *{} ({})", update.package_extension, update.app_identity);
        println!("  Download path:     {}", update.artifact_path().display());
        println!("  Preferences:       {}", ctx.preferences_path()?.display());

        println!();
        let checks = if prefs.update_check_enabled {
            "enabled".green()
        } else {
            "disabled".yellow()
        };
        println!("  Automatic checks:  {checks} (every {}s)", update.check_interval);
        println!("  Last check:        {}", format_timestamp(prefs.last_update_check));
        println!("  Skipped version:   {}", prefs.skip_version.as_deref().unwrap_or("none"));

        let command = installer.command_line(&update.artifact_path()).join(" ");
        let available = if installer.can_install_packages() {
            "available".green()
        } else {
            "unavailable".red()
        };
        println!("  Installer:         {command} ({available})");
        Ok(())
    }
}

fn format_timestamp(millis: i64) -> String {
    if millis <= 0 {
        return "never".to_string();
    }
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map_or_else(|| millis.to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}
