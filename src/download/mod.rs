//! Package download session: streaming, progress, cancellation and validation.
//!
//! [`DownloadManager`] owns a single download at a time. Progress and the
//! outcome are published as [`DownloadState`] values on a watch channel; a
//! finished download is checked by [`ArtifactValidator`] before it is reported
//! as complete.
//!
//! | From | Event | To |
//! |---|---|---|
//! | `Idle` | `download(url)` | `Downloading{0}` |
//! | `Downloading{p}` | chunk received | `Downloading{p'}` |
//! | `Downloading` | body done, validation ok | `Complete{path}` |
//! | `Downloading` | validation failed | `Error` (artifact deleted) |
//! | `Downloading` | network or disk failure | `Error` (partial artifact kept) |
//! | `Downloading` | `cancel()` | `Cancelled` (artifact deleted) |
//! | terminal | `reset()` | `Idle` |

mod inspector;
mod manager;
mod state;
mod validation;

pub use inspector::{PackageInspector, PackageManifest, ZipPackageInspector};
pub use manager::{DownloadManager, DownloadTimeouts};
pub use state::DownloadState;
pub use validation::{ArtifactValidator, ValidationCheck, ValidationFailure};

use crate::config::UpdateConfig;
use crate::core::UpdateError;
use std::sync::Arc;

impl DownloadManager {
    /// Create a manager from configuration, validating zip packages against
    /// the configured application identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &UpdateConfig) -> Result<Self, UpdateError> {
        let validator = ArtifactValidator::new(
            config.min_package_size,
            &config.app_identity,
            Arc::new(ZipPackageInspector::default()),
        );
        Self::new(config.artifact_path(), validator, DownloadTimeouts::from(config))
    }
}
