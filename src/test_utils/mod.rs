//! Test utilities for Uplift
//!
//! Helpers shared by unit tests and the integration suite:
//! - [`init_test_logging`] - one-time tracing setup that respects `RUST_LOG`
//! - [`package_bytes`] / [`write_package`] - build zip packages with a manifest
//! - [`release_json`] - a release object in API wire format
//!
//! # Example
//!
//! ```rust,no_run
//! use uplift_cli::test_utils::write_package;
//!
//! let dir = tempfile::TempDir::new().unwrap();
//! let path = dir.path().join("update.zip");
//! // 2 MiB of padding so the package passes the default size check
//! write_package(&path, "dev.uplift.app", 2 * 1024 * 1024).unwrap();
//! ```

use crate::constants::PACKAGE_MANIFEST_ENTRY;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; does nothing if neither is set.
///
/// ```bash
/// RUST_LOG=uplift_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Build an uncompressed zip package in memory.
///
/// The archive holds a `package.toml` declaring `identifier` (version `1.0.0`)
/// and, when `padding` is non-zero, a `payload.bin` of `padding` bytes so tests
/// can control the artifact size.
pub fn package_bytes(identifier: &str, padding: usize) -> std::io::Result<Vec<u8>> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));

    writer.start_file(PACKAGE_MANIFEST_ENTRY, options).map_err(std::io::Error::other)?;
    writeln!(writer, "identifier = \"{identifier}\"")?;
    writeln!(writer, "version = \"1.0.0\"")?;

    if padding > 0 {
        writer.start_file("payload.bin", options).map_err(std::io::Error::other)?;
        writer.write_all(&vec![0u8; padding])?;
    }

    Ok(writer.finish().map_err(std::io::Error::other)?.into_inner())
}

/// Write a package built by [`package_bytes`] to `path`.
pub fn write_package(path: &Path, identifier: &str, padding: usize) -> std::io::Result<()> {
    std::fs::write(path, package_bytes(identifier, padding)?)
}

/// A release in API wire format with one asset per entry of `assets`
/// (`(name, download_url)`).
pub fn release_json(tag: &str, prerelease: bool, assets: &[(&str, &str)]) -> serde_json::Value {
    let assets: Vec<serde_json::Value> = assets
        .iter()
        .map(|(name, url)| serde_json::json!({ "name": name, "browser_download_url": url }))
        .collect();

    serde_json::json!({
        "tag_name": tag,
        "name": format!("Release {tag}"),
        "html_url": format!("https://example.com/releases/{tag}"),
        "body": format!("Changes in {tag}"),
        "prerelease": prerelease,
        "draft": false,
        "assets": assets,
    })
}
