use super::common::{CommandContext, install_package, print_update, run_download, running_version};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Check for a newer release and download its package.
///
/// When the release has no package asset, the release page is printed instead.
#[derive(Args, Debug)]
pub struct UpdateCommand {
    /// Version to compare against (defaults to this build's version)
    #[arg(long, value_name = "VERSION")]
    current: Option<String>,

    /// Launch the installer once the package is validated
    #[arg(long)]
    install: bool,
}

impl UpdateCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let ctx = CommandContext::load(config_path).await?;
        let checker = ctx.checker().await?;
        let current = self.current.unwrap_or_else(running_version);

        println!("{}", "Checking for updates...".cyan());
        let Some(info) = checker.check_for_update(&current).await else {
            println!("{}", format!("You are on the latest version ({current})").green());
            return Ok(());
        };
        print_update(&info);

        if !info.can_auto_download() {
            println!(
                "{}",
                format!("No package attached; download it from {}", info.download_url()).yellow()
            );
            return Ok(());
        }

        let manager = ctx.download_manager()?;
        let Some(artifact) = run_download(&manager, info.download_url()).await? else {
            return Ok(());
        };

        if self.install {
            install_package(&ctx.installer(), &artifact).await?;
        }
        Ok(())
    }
}
