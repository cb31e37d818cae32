//! Terminal progress display for package downloads.
//!
//! Wraps an `indicatif` bar that tracks the percentage published by
//! [`DownloadManager`](crate::download::DownloadManager). The bar is hidden when
//! the `UPLIFT_NO_PROGRESS` environment variable is set (the CLI sets it for
//! `--no-progress`), which keeps output clean in scripts and CI logs.
//!
//! # Examples
//!
//! ```rust
//! use uplift_cli::utils::progress::ProgressBar;
//!
//! let progress = ProgressBar::new_download("uplift-1.3.0.zip");
//! progress.set_percent(40);
//! progress.set_percent(100);
//! progress.finish_with_message("Download complete");
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};

/// Environment variable that disables progress bars when set to any value.
pub const NO_PROGRESS_ENV: &str = "UPLIFT_NO_PROGRESS";

/// Whether progress bars are disabled for this process.
pub fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// A percentage progress bar with Uplift styling.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Create a bar from 0 to 100 labelled with `label`.
    ///
    /// Returns a hidden bar, which ignores every call, when progress is disabled.
    pub fn new_download(label: impl Into<String>) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(100);
            bar.set_style(download_style());
            bar
        };
        bar.set_prefix(label.into());
        Self {
            inner: bar,
        }
    }

    /// Move the bar to `percent` (clamped to 100).
    pub fn set_percent(&self, percent: u8) {
        self.inner.set_position(u64::from(percent.min(100)));
    }

    /// Current position.
    pub fn percent(&self) -> u64 {
        self.inner.position()
    }

    /// Whether the bar draws anything.
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }

    /// Complete the bar and leave `msg` on screen.
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.inner.finish_with_message(msg.into());
    }

    /// Stop the bar where it is and leave `msg` on screen.
    pub fn abandon_with_message(&self, msg: impl Into<String>) {
        self.inner.abandon_with_message(msg.into());
    }
}

fn download_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("━╸━")
}
