use super::common::{CommandContext, print_update, running_version};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Look for a newer stable release.
///
/// ```bash
/// uplift check
/// uplift check --current 1.2.0
/// uplift check --if-due   # respects the check interval and the enable toggle
/// ```
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Version to compare against (defaults to this build's version)
    #[arg(long, value_name = "VERSION")]
    current: Option<String>,

    /// Only check when automatic checks are enabled and the interval has elapsed
    #[arg(long)]
    if_due: bool,
}

impl CheckCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let ctx = CommandContext::load(config_path).await?;
        let checker = ctx.checker().await?;
        let current = self.current.unwrap_or_else(running_version);

        if self.if_due && !checker.should_check_on_startup().await {
            println!("Update check is not due");
            return Ok(());
        }

        println!("{}", "Checking for updates...".cyan());
        match checker.check_for_update(&current).await {
            Some(info) => {
                print_update(&info);
                if info.can_auto_download() {
                    println!("Run `uplift update` to download it");
                }
            }
            None => {
                println!("{}", format!("You are on the latest version ({current})").green());
            }
        }
        Ok(())
    }
}
