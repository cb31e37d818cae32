//! Reading package metadata out of a downloaded artifact.

use crate::constants::PACKAGE_MANIFEST_ENTRY;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Metadata a package declares about itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    /// Application identifier, compared against the configured identity.
    pub identifier: String,
    /// Version the package installs, if declared.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parses a package file and extracts its manifest.
///
/// Called from a blocking thread; implementations may do synchronous I/O.
pub trait PackageInspector: Send + Sync {
    /// Read the manifest of the package at `path`.
    ///
    /// # Errors
    ///
    /// Returns a description of why the file is not a readable package.
    fn inspect(&self, path: &Path) -> Result<PackageManifest, String>;
}

/// Inspector for zip packages carrying a TOML manifest entry.
///
/// ```toml
/// # package.toml
/// identifier = "dev.uplift.app"
/// version = "1.3.0"
/// ```
#[derive(Debug, Clone)]
pub struct ZipPackageInspector {
    manifest_entry: String,
}

impl Default for ZipPackageInspector {
    fn default() -> Self {
        Self::new(PACKAGE_MANIFEST_ENTRY)
    }
}

impl ZipPackageInspector {
    /// Inspector reading the manifest from `manifest_entry` inside the archive.
    pub fn new(manifest_entry: impl Into<String>) -> Self {
        Self {
            manifest_entry: manifest_entry.into(),
        }
    }
}

impl PackageInspector for ZipPackageInspector {
    fn inspect(&self, path: &Path) -> Result<PackageManifest, String> {
        let file = File::open(path).map_err(|e| format!("cannot open package: {e}"))?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| format!("not a valid zip archive: {e}"))?;

        let mut entry = archive
            .by_name(&self.manifest_entry)
            .map_err(|_| format!("package has no {} entry", self.manifest_entry))?;

        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|e| format!("cannot read {}: {e}", self.manifest_entry))?;

        toml::from_str(&content).map_err(|e| format!("invalid {}: {e}", self.manifest_entry))
    }
}
