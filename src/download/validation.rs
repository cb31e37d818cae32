//! Ordered checks a downloaded artifact must pass before it is offered for install.

use super::inspector::{PackageInspector, PackageManifest};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Named validation steps, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationCheck {
    /// The artifact file exists.
    ArtifactExists,
    /// The artifact is at least the configured minimum size.
    MinimumSize,
    /// The package inspector can read the artifact's manifest.
    PackageParseable,
    /// The manifest identifier equals the expected application identity.
    IdentityMatches,
}

impl ValidationCheck {
    /// Every check in execution order.
    pub const ALL: [Self; 4] =
        [Self::ArtifactExists, Self::MinimumSize, Self::PackageParseable, Self::IdentityMatches];

    /// Stable name of the check.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ArtifactExists => "artifact-exists",
            Self::MinimumSize => "minimum-size",
            Self::PackageParseable => "package-parseable",
            Self::IdentityMatches => "identity-matches",
        }
    }
}

impl fmt::Display for ValidationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failed validation check and why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Package validation failed ({check}): {reason}")]
pub struct ValidationFailure {
    /// The check that failed.
    pub check: ValidationCheck,
    /// Why it failed.
    pub reason: String,
}

impl ValidationFailure {
    /// Create a failure for `check`.
    pub fn new(check: ValidationCheck, reason: impl Into<String>) -> Self {
        Self {
            check,
            reason: reason.into(),
        }
    }
}

/// Runs the [`ValidationCheck`]s against an artifact.
#[derive(Clone)]
pub struct ArtifactValidator {
    min_size: u64,
    expected_identity: String,
    inspector: Arc<dyn PackageInspector>,
}

impl fmt::Debug for ArtifactValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactValidator")
            .field("min_size", &self.min_size)
            .field("expected_identity", &self.expected_identity)
            .finish_non_exhaustive()
    }
}

impl ArtifactValidator {
    /// Create a validator.
    pub fn new(
        min_size: u64,
        expected_identity: impl Into<String>,
        inspector: Arc<dyn PackageInspector>,
    ) -> Self {
        Self {
            min_size,
            expected_identity: expected_identity.into(),
            inspector,
        }
    }

    /// Run every check in order and stop at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationFailure`].
    pub async fn validate(&self, path: &Path) -> Result<PackageManifest, ValidationFailure> {
        let size = Self::check_exists(path).await?;
        self.check_size(size)?;
        let manifest = self.check_parseable(path).await?;
        self.check_identity(&manifest)?;
        debug!("Artifact {} passed validation ({size} bytes)", path.display());
        Ok(manifest)
    }

    async fn check_exists(path: &Path) -> Result<u64, ValidationFailure> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(meta.len()),
            Ok(_) => Err(ValidationFailure::new(
                ValidationCheck::ArtifactExists,
                format!("{} is not a regular file", path.display()),
            )),
            Err(e) => Err(ValidationFailure::new(
                ValidationCheck::ArtifactExists,
                format!("{} is missing: {e}", path.display()),
            )),
        }
    }

    fn check_size(&self, size: u64) -> Result<(), ValidationFailure> {
        if size < self.min_size {
            return Err(ValidationFailure::new(
                ValidationCheck::MinimumSize,
                format!("artifact is {size} bytes, expected at least {}", self.min_size),
            ));
        }
        Ok(())
    }

    async fn check_parseable(&self, path: &Path) -> Result<PackageManifest, ValidationFailure> {
        let inspector = Arc::clone(&self.inspector);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || inspector.inspect(&path))
            .await
            .map_err(|e| {
                ValidationFailure::new(
                    ValidationCheck::PackageParseable,
                    format!("inspector task failed: {e}"),
                )
            })?
            .map_err(|reason| ValidationFailure::new(ValidationCheck::PackageParseable, reason))
    }

    fn check_identity(&self, manifest: &PackageManifest) -> Result<(), ValidationFailure> {
        if manifest.identifier != self.expected_identity {
            return Err(ValidationFailure::new(
                ValidationCheck::IdentityMatches,
                format!(
                    "package identifies as '{}', expected '{}'",
                    manifest.identifier, self.expected_identity
                ),
            ));
        }
        Ok(())
    }
}
