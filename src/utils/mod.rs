//! Terminal helpers for the `uplift` binary.
//!
//! - [`progress`] - download progress bar that honours `--no-progress`

pub mod progress;

pub use progress::ProgressBar;
