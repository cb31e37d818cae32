use super::common::{CommandContext, install_package, run_download};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Download a package from a URL and validate it.
///
/// Press Ctrl-C to cancel; the partial file is removed.
#[derive(Args, Debug)]
pub struct DownloadCommand {
    /// Package URL
    url: String,

    /// Launch the installer once the package is validated
    #[arg(long)]
    install: bool,
}

impl DownloadCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let ctx = CommandContext::load(config_path).await?;
        let manager = ctx.download_manager()?;

        let artifact = run_download(&manager, &self.url).await?;

        match artifact {
            Some(path) if self.install => install_package(&ctx.installer(), &path).await,
            _ => Ok(()),
        }
    }
}
