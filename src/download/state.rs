use std::fmt;
use std::path::PathBuf;

/// Observable state of a [`DownloadManager`](super::DownloadManager).
///
/// ```text
/// Idle ──download──▶ Downloading{p} ──▶ Complete | Error | Cancelled
///  ▲                                          │
///  └──────────────────reset───────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadState {
    /// No download has been started since creation or the last reset.
    #[default]
    Idle,
    /// Transfer running; `progress` is a percentage in `0..=100`.
    Downloading {
        /// Percentage of the content length received so far.
        progress: u8,
    },
    /// The artifact was downloaded and passed validation.
    Complete {
        /// Location of the validated artifact.
        artifact_path: PathBuf,
    },
    /// The transfer or validation failed.
    Error {
        /// Human-readable cause.
        message: String,
    },
    /// The user cancelled the transfer; the partial artifact was removed.
    Cancelled,
}

impl DownloadState {
    /// Whether this state ends an attempt.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. } | Self::Cancelled)
    }

    /// Short lowercase name, used in logs and error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Downloading { .. } => "downloading",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloading { progress } => write!(f, "downloading ({progress}%)"),
            Self::Complete { artifact_path } => {
                write!(f, "complete ({})", artifact_path.display())
            }
            Self::Error { message } => write!(f, "error: {message}"),
            other => f.write_str(other.name()),
        }
    }
}
