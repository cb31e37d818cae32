//! Core types shared by every part of Uplift.
//!
//! At the moment this is the error system:
//! - [`UpdateError`] - enumerated failures for checks, downloads and installs
//! - [`ErrorContext`] - user-facing wrapper with details and suggestions
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] for CLI display

pub mod error;

pub use error::{ErrorContext, UpdateError, user_friendly_error};
