//! Error handling for Uplift
//!
//! This module provides the error types and user-friendly error reporting used by the
//! update subsystem. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling by the host application
//! 2. **User-friendly messages** with actionable suggestions for the CLI
//!
//! # Architecture
//!
//! - [`UpdateError`] - Enumerated failure cases of checking, downloading and installing
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//! - [`user_friendly_error`] - Converts any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! # Propagation Policy
//!
//! Update checks are best-effort: [`UpdateChecker`](crate::checker::UpdateChecker)
//! logs failures and reports "no update" instead of returning them. Downloads are
//! user-initiated, so their failures are published as
//! [`DownloadState::Error`](crate::download::DownloadState::Error), with the
//! typed cause available from
//! [`DownloadManager::last_error`](crate::download::DownloadManager::last_error).
//! State-machine violations are returned directly to the caller.
//!
//! # Examples
//!
//! ```rust,no_run
//! use uplift_cli::core::{ErrorContext, UpdateError};
//!
//! let context = ErrorContext::new(UpdateError::DownloadInProgress)
//!     .with_suggestion("Wait for the current download to finish or cancel it")
//!     .with_details("Only one package download may run at a time");
//!
//! context.display();
//! ```

use crate::download::ValidationFailure;
use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for Uplift operations.
///
/// Each variant carries enough context to render a short, human-readable cause.
/// Variants hold owned strings rather than source errors so the type stays
/// [`Clone`] and can be stored inside published download states.
#[derive(Error, Debug, Clone)]
pub enum UpdateError {
    /// A network request could not be completed (connect, read, timeout).
    #[error("Network error during {operation}: {reason}")]
    NetworkError {
        /// The operation that failed (e.g., "release fetch", "artifact download")
        operation: String,
        /// Transport-level reason
        reason: String,
    },

    /// The server answered with a non-success HTTP status.
    #[error("Request to {url} failed with HTTP {status}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// A response body could not be decoded.
    #[error("Failed to parse {what}: {reason}")]
    ParseError {
        /// What was being parsed (e.g., "release list")
        what: String,
        /// Parser message
        reason: String,
    },

    /// Local file system operation failed.
    #[error("File system error during {operation} on {path}: {reason}")]
    FileSystemError {
        /// The operation that failed (e.g., "write", "remove")
        operation: String,
        /// Path involved
        path: String,
        /// Underlying I/O message
        reason: String,
    },

    /// A download was requested while another one is still running.
    #[error("A download is already in progress")]
    DownloadInProgress,

    /// An operation is not permitted in the current download state.
    #[error("Cannot {operation} while download state is {state}")]
    InvalidState {
        /// The rejected operation (e.g., "start a download", "reset")
        operation: String,
        /// Name of the current state
        state: String,
    },

    /// The downloaded artifact failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The platform installer refused or failed to start.
    #[error("Installation failed: {reason}")]
    InstallFailed {
        /// Installer message
        reason: String,
    },

    /// The process is not allowed to install packages.
    #[error("Installing packages is not permitted on this system")]
    InstallNotPermitted,

    /// Configuration file or value problem.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// The preference store could not be read or written.
    #[error("Preference store error: {message}")]
    PreferenceError {
        /// Description of the preference store failure
        message: String,
    },

    /// Any other error.
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl UpdateError {
    /// Build a [`UpdateError::FileSystemError`] from an I/O error.
    pub fn file_system(
        operation: impl Into<String>,
        path: &std::path::Path,
        error: &std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            operation: operation.into(),
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }

    /// Build a [`UpdateError::NetworkError`] from a transport error.
    pub fn network(operation: impl Into<String>, error: &reqwest::Error) -> Self {
        let reason = if error.is_timeout() {
            "operation timed out".to_string()
        } else if error.is_connect() {
            format!("connection failed ({error})")
        } else {
            error.to_string()
        };
        Self::NetworkError {
            operation: operation.into(),
            reason,
        }
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// Pairs an [`UpdateError`] with an optional suggestion and optional details
/// for display in the terminal.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: UpdateError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: UpdateError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions.
///
/// Recognises [`UpdateError`], [`std::io::Error`] and [`toml::de::Error`] anywhere in
/// the chain; everything else is rendered with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(update_error) = error.chain().find_map(|e| e.downcast_ref::<UpdateError>()) {
        return create_error_context(update_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(UpdateError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                    reason: io_error.to_string(),
                })
                .with_suggestion("Check ownership of the download directory and the configuration file")
                .with_details("Uplift could not read or write a file it needs");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(UpdateError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                    reason: io_error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.chain().find_map(|e| e.downcast_ref::<toml::de::Error>()) {
        return ErrorContext::new(UpdateError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of your configuration file (~/.uplift/config.toml)");
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(UpdateError::Other {
        message,
    })
}

/// Map each [`UpdateError`] variant to tailored suggestions and details.
fn create_error_context(error: UpdateError) -> ErrorContext {
    match &error {
        UpdateError::NetworkError { .. } => ErrorContext::new(error)
            .with_suggestion("Check your internet connection and try again with `uplift download` (Retry)")
            .with_details("The connection timed out or was interrupted before the transfer finished"),

        UpdateError::HttpStatus { status, .. } => {
            let suggestion = match status {
                404 => "The release asset no longer exists. Run `uplift check` to find the current release",
                403 | 429 => "The release server is rate limiting requests. Wait a few minutes and try again",
                _ => "The release server returned an error. Try again later",
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        UpdateError::DownloadInProgress => ErrorContext::new(error)
            .with_suggestion("Wait for the current download to finish or cancel it first")
            .with_details("Only one package download may run at a time"),

        UpdateError::InvalidState { .. } => ErrorContext::new(error)
            .with_suggestion("Reset the download session before starting a new attempt"),

        UpdateError::Validation(_) => ErrorContext::new(error)
            .with_suggestion("Retry the download; if it keeps failing the published package may be broken")
            .with_details("The downloaded file was deleted because it is not a valid package for this application"),

        UpdateError::InstallNotPermitted => ErrorContext::new(error)
            .with_suggestion("Set `update.install_command` in ~/.uplift/config.toml to an installer available on this system"),

        UpdateError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Check ~/.uplift/config.toml or the file passed with --config"),

        UpdateError::PreferenceError { .. } => ErrorContext::new(error)
            .with_suggestion("Delete the preferences file to restore defaults; it is recreated on the next check"),

        _ => ErrorContext::new(error),
    }
}
