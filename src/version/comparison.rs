//! Update detection on top of [`Version`] ordering.
//!
//! # Examples
//!
//! ```rust
//! use uplift_cli::version::{UpdateStatus, VersionComparator};
//!
//! assert_eq!(VersionComparator::compare("v1.2.3", "v1.2.4"), UpdateStatus::UpdateAvailable);
//! assert_eq!(VersionComparator::compare("2.0.0", "1.9.9"), UpdateStatus::UpToDate);
//!
//! assert!(VersionComparator::is_strict_release_tag("v1.2.3"));
//! assert!(!VersionComparator::is_strict_release_tag("1.2.3-beta.1"));
//! ```

use super::Version;
use regex::Regex;
use std::sync::LazyLock;

/// Tags offered as updates: optional lowercase `v`, then exactly three numeric parts.
///
/// ASCII digits only, matching what [`Version::parse`] reads.
static STRICT_RELEASE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?[0-9]+\.[0-9]+\.[0-9]+$").expect("static regex is valid"));

/// Outcome of comparing the running version against a candidate release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The candidate is strictly newer than the running version.
    UpdateAvailable,
    /// The running version is the same as, or newer than, the candidate.
    UpToDate,
}

/// Version comparison utilities for update detection.
///
/// This struct provides static methods only; it carries no state.
pub struct VersionComparator;

impl VersionComparator {
    /// Decide whether `latest` is an update over `current`.
    ///
    /// Returns [`UpdateStatus::UpdateAvailable`] exactly when
    /// `Version::parse(latest) > Version::parse(current)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uplift_cli::version::{UpdateStatus, VersionComparator};
    ///
    /// // Missing components are zero, so these are the same version
    /// assert_eq!(VersionComparator::compare("v0.9", "v0.9.0"), UpdateStatus::UpToDate);
    /// ```
    #[must_use]
    pub fn compare(current: &str, latest: &str) -> UpdateStatus {
        if Version::parse(latest) > Version::parse(current) {
            UpdateStatus::UpdateAvailable
        } else {
            UpdateStatus::UpToDate
        }
    }

    /// Whether `tag` has the strict release shape `v?digits.digits.digits`.
    ///
    /// Pre-release and build suffixes (`1.2.3-beta.1`, `1.2.3+7`) are rejected.
    #[must_use]
    pub fn is_strict_release_tag(tag: &str) -> bool {
        STRICT_RELEASE_TAG.is_match(tag)
    }
}
