//! Version identifier parsing and ordering for release tags.
//!
//! Release tags published by the project look like `v1.4.2`, but the running
//! application may report its version in looser forms (`1.4`, `V2.0.0-rc1`,
//! `0.9.0+build.7`). This module parses all of them into a plain
//! three-component [`Version`] without ever failing.
//!
//! # Module Organization
//!
//! - [`Version`] - the parsed `major.minor.patch` triple and its total order
//! - [`comparison`] - [`VersionComparator`] for deciding whether an update exists and
//!   for recognising strict release tags
//!
//! # Parsing Rules
//!
//! 1. One leading `v` or `V` is stripped.
//! 2. The remainder is split on `.`; only the first three parts are used.
//! 3. Each part contributes its leading ASCII digits. A part that is missing,
//!    empty, non-numeric or too large for `u64` becomes `0`.
//!
//! Anything after the digits of a part (pre-release labels, build metadata) is
//! discarded, so `1.2.3-beta` and `1.2.3` compare equal. This is intentionally
//! lossy: only strict `digits.digits.digits` tags are ever offered as updates,
//! see [`VersionComparator::is_strict_release_tag`].
//!
//! # Examples
//!
//! ```rust
//! use uplift_cli::version::Version;
//!
//! let v = Version::parse("v1.2.3");
//! assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));
//!
//! // Missing components default to zero
//! assert_eq!(Version::parse("v0.9"), Version::parse("0.9.0"));
//!
//! // Garbage never fails
//! assert_eq!(Version::parse("not-a-version"), Version::default());
//! ```

pub mod comparison;

pub use comparison::{UpdateStatus, VersionComparator};

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A release version reduced to its numeric `major.minor.patch` components.
///
/// Ordering compares `major`, then `minor`, then `patch`. Two versions are equal
/// exactly when all three components match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Version {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
}

impl Version {
    /// Create a version from its three components.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version identifier. Never fails.
    ///
    /// See the [module documentation](self) for the exact rules.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let stripped = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let mut parts = stripped.split('.').map(parse_component);

        Self {
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            patch: parts.next().unwrap_or(0),
        }
    }
}

/// Leading digits of a dotted component, or `0`.
fn parse_component(part: &str) -> u64 {
    let digits_end = part.find(|c: char| !c.is_ascii_digit()).unwrap_or(part.len());
    part[..digits_end].parse().unwrap_or(0)
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
