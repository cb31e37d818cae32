//! Global constants used throughout the Uplift codebase.
//!
//! This module contains timeout durations, thresholds, and other numeric
//! constants shared by the checker, the download manager and the CLI.
//! Defining them centrally keeps the defaults in `UpdateConfig` and the
//! code paths that fall back to them in agreement.

use std::time::Duration;

/// Minimum time between automatic update checks (24 hours).
pub const UPDATE_CHECK_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Timeout for establishing an HTTP connection (30 seconds).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a single read from an HTTP response body (30 seconds).
///
/// The read timeout bounds each chunk, not the whole transfer, so large
/// artifacts on slow links are not cut off as long as bytes keep flowing.
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for writing one chunk to the local artifact file (30 seconds).
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Smallest artifact accepted as a plausible package (1 MiB).
///
/// Anything smaller is almost certainly a truncated transfer or an HTML
/// error page served with a 200 status.
pub const MIN_PACKAGE_SIZE: u64 = 1024 * 1024;

/// File extension that marks a release asset as an installable package.
pub const DEFAULT_PACKAGE_EXTENSION: &str = ".zip";

/// Name of the manifest entry read from inside a package archive.
pub const PACKAGE_MANIFEST_ENTRY: &str = "package.toml";

/// Base name of the cached artifact file; the package extension is appended.
pub const ARTIFACT_FILE_STEM: &str = "update";

/// Default GitHub API endpoint for release metadata.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default repository owner queried for releases.
pub const DEFAULT_REPO_OWNER: &str = "uplift-dev";

/// Default repository name queried for releases.
pub const DEFAULT_REPO_NAME: &str = "uplift";

/// Package identity the running application expects a downloaded artifact to declare.
pub const DEFAULT_APP_IDENTITY: &str = "dev.uplift.app";

/// User agent sent with every HTTP request.
pub fn user_agent() -> String {
    format!("uplift/{}", env!("CARGO_PKG_VERSION"))
}
