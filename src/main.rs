//! Uplift CLI entry point
//!
//! Parses arguments, runs the selected command and renders failures with
//! suggestions. Commands:
//! - `check` - Look for a newer stable release
//! - `download` - Download and validate a package
//! - `update` - Check and download in one step
//! - `skip` - Manage the skipped version
//! - `status` - Show configuration and preferences
//! - `checks` - Toggle automatic update checks

use anyhow::Result;
use clap::Parser;
use uplift_cli::cli;
use uplift_cli::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
