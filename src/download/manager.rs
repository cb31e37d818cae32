use super::state::DownloadState;
use super::validation::{ArtifactValidator, ValidationFailure};
use crate::config::UpdateConfig;
use crate::constants::{CONNECT_TIMEOUT, READ_TIMEOUT, WRITE_TIMEOUT, user_agent};
use crate::core::UpdateError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Time limits applied to a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadTimeouts {
    /// Establishing the connection.
    pub connect: Duration,
    /// Gap between two reads of the response body.
    pub read: Duration,
    /// Writing one chunk to disk.
    pub write: Duration,
}

impl Default for DownloadTimeouts {
    fn default() -> Self {
        Self {
            connect: CONNECT_TIMEOUT,
            read: READ_TIMEOUT,
            write: WRITE_TIMEOUT,
        }
    }
}

impl From<&UpdateConfig> for DownloadTimeouts {
    fn from(config: &UpdateConfig) -> Self {
        Self {
            connect: config.connect_timeout(),
            read: config.read_timeout(),
            write: config.write_timeout(),
        }
    }
}

/// Downloads one package at a time and publishes its progress.
///
/// The manager is a cheap handle; clones share the same session. State changes
/// are observed through [`subscribe`](Self::subscribe). While an attempt runs,
/// its task is the only writer of the state; a terminal state is published
/// exactly once per attempt, under the same lock [`cancel`](Self::cancel) takes.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use uplift_cli::download::{
///     ArtifactValidator, DownloadManager, DownloadState, DownloadTimeouts, ZipPackageInspector,
/// };
///
/// # async fn example() -> anyhow::Result<()> {
/// let validator =
///     ArtifactValidator::new(1024 * 1024, "dev.uplift.app", Arc::new(ZipPackageInspector::default()));
/// let manager =
///     DownloadManager::new("/tmp/uplift/update.zip", validator, DownloadTimeouts::default())?;
///
/// manager.download("https://example.com/uplift-1.3.0.zip")?;
/// match manager.wait_for_terminal().await {
///     DownloadState::Complete { artifact_path } => println!("ready: {}", artifact_path.display()),
///     other => println!("download ended: {other}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DownloadManager {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    client: Client,
    artifact_path: PathBuf,
    validator: ArtifactValidator,
    write_timeout: Duration,
    state: watch::Sender<DownloadState>,
    active: Mutex<Option<Attempt>>,
    failure: Mutex<Option<UpdateError>>,
    next_attempt: AtomicU64,
}

#[derive(Debug)]
struct Attempt {
    id: u64,
    cancel: CancellationToken,
}

/// Why a transfer stopped before the body was fully written.
enum Interrupt {
    Cancelled,
    Failed(UpdateError),
}

impl From<UpdateError> for Interrupt {
    fn from(error: UpdateError) -> Self {
        Self::Failed(error)
    }
}

/// Result of an attempt, before cancellation is taken into account.
enum Outcome {
    Complete,
    Cancelled,
    TransferFailed(UpdateError),
    ValidationFailed(ValidationFailure),
}

impl DownloadManager {
    /// Create a manager that downloads to `artifact_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        artifact_path: impl Into<PathBuf>,
        validator: ArtifactValidator,
        timeouts: DownloadTimeouts,
    ) -> Result<Self, UpdateError> {
        let client = Client::builder()
            .user_agent(user_agent())
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .build()
            .map_err(|e| UpdateError::network("client setup", &e))?;

        let (state, _) = watch::channel(DownloadState::Idle);

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                artifact_path: artifact_path.into(),
                validator,
                write_timeout: timeouts.write,
                state,
                active: Mutex::new(None),
                failure: Mutex::new(None),
                next_attempt: AtomicU64::new(0),
            }),
        })
    }

    /// Start downloading `url` in the background.
    ///
    /// Publishes `Downloading { progress: 0 }` before returning the attempt id.
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::DownloadInProgress`] while another attempt is running
    /// - [`UpdateError::InvalidState`] after an attempt ended; call [`reset`](Self::reset) first
    pub fn download(&self, url: &str) -> Result<u64, UpdateError> {
        let mut active = self.inner.lock_active();

        match &*self.inner.state.borrow() {
            DownloadState::Idle => {}
            DownloadState::Downloading { .. } => return Err(UpdateError::DownloadInProgress),
            other => {
                return Err(UpdateError::InvalidState {
                    operation: "start a download".to_string(),
                    state: other.name().to_string(),
                });
            }
        }

        let id = self.inner.next_attempt.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();
        *active = Some(Attempt {
            id,
            cancel: cancel.clone(),
        });
        self.inner.take_failure();
        self.inner.state.send_replace(DownloadState::Downloading {
            progress: 0,
        });
        drop(active);

        info!("Starting download #{id} from {url}");
        let inner = Arc::clone(&self.inner);
        let url = url.to_string();
        tokio::spawn(async move { inner.run(id, url, cancel).await });

        Ok(id)
    }

    /// Ask the running attempt to stop.
    ///
    /// Returns `true` if an attempt was signalled. The attempt removes its
    /// partial artifact and then publishes [`DownloadState::Cancelled`].
    pub fn cancel(&self) -> bool {
        let active = self.inner.lock_active();
        match active.as_ref() {
            Some(attempt) if !attempt.cancel.is_cancelled() => {
                info!("Cancelling download #{}", attempt.id);
                attempt.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Return to [`DownloadState::Idle`] after an attempt ended.
    ///
    /// A no-op when already idle.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::InvalidState`] while a download is running.
    pub fn reset(&self) -> Result<(), UpdateError> {
        let _active = self.inner.lock_active();
        let current = self.inner.state.borrow().clone();
        match current {
            DownloadState::Downloading { .. } => Err(UpdateError::InvalidState {
                operation: "reset".to_string(),
                state: current.name().to_string(),
            }),
            DownloadState::Idle => Ok(()),
            _ => {
                debug!("Resetting download state from {}", current.name());
                self.inner.take_failure();
                self.inner.state.send_replace(DownloadState::Idle);
                Ok(())
            }
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DownloadState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<DownloadState> {
        self.inner.state.subscribe()
    }

    /// Wait until the current attempt reaches a terminal state and return it.
    ///
    /// Returns immediately if the state is already terminal, or `Idle` when no
    /// attempt is running.
    pub async fn wait_for_terminal(&self) -> DownloadState {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !matches!(state, DownloadState::Downloading { .. })).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// The error behind the current [`DownloadState::Error`].
    ///
    /// Cleared by [`reset`](Self::reset) and when the next download starts.
    pub fn last_error(&self) -> Option<UpdateError> {
        let _active = self.inner.lock_active();
        if !matches!(&*self.inner.state.borrow(), DownloadState::Error { .. }) {
            return None;
        }
        self.inner.failure.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Where the artifact is written.
    pub fn artifact_path(&self) -> &Path {
        &self.inner.artifact_path
    }
}

impl Inner {
    fn lock_active(&self) -> MutexGuard<'_, Option<Attempt>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_failure(&self) -> Option<UpdateError> {
        self.failure.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    fn record_failure(&self, error: UpdateError) -> DownloadState {
        let message = error.to_string();
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
        DownloadState::Error {
            message,
        }
    }

    async fn run(self: Arc<Self>, id: u64, url: String, cancel: CancellationToken) {
        let outcome = match self.transfer(&url, &cancel).await {
            Ok(bytes) => {
                debug!("Download #{id} received {bytes} bytes, validating");
                match self.validator.validate(&self.artifact_path).await {
                    Ok(_) => Outcome::Complete,
                    Err(failure) => {
                        warn!("Download #{id} rejected: {failure}");
                        Outcome::ValidationFailed(failure)
                    }
                }
            }
            Err(Interrupt::Cancelled) => Outcome::Cancelled,
            Err(Interrupt::Failed(e)) => {
                warn!("Download #{id} failed: {e}");
                Outcome::TransferFailed(e)
            }
        };

        self.finish(id, &cancel, outcome);
    }

    /// Stream `url` into the artifact file. Returns the number of bytes written.
    async fn transfer(&self, url: &str, cancel: &CancellationToken) -> Result<u64, Interrupt> {
        let path = &self.artifact_path;

        match fs::remove_file(path).await {
            Ok(()) => debug!("Removed previous artifact {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(UpdateError::file_system("remove", path, &e).into()),
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| UpdateError::file_system("create directory", parent, &e))?;
        }

        let mut response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Interrupt::Cancelled),
            response = self.client.get(url).send() => {
                response.map_err(|e| UpdateError::network("artifact download", &e))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let total = response.content_length().filter(|len| *len > 0);
        let mut file =
            fs::File::create(path).await.map_err(|e| UpdateError::file_system("create", path, &e))?;
        let mut received: u64 = 0;
        let mut last_progress: u8 = 0;

        loop {
            let chunk = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Interrupt::Cancelled),
                chunk = response.chunk() => {
                    chunk.map_err(|e| UpdateError::network("artifact download", &e))?
                }
            };
            let Some(chunk) = chunk else {
                break;
            };

            self.write_with_timeout(file.write_all(&chunk), path).await?;
            received += chunk.len() as u64;

            if let Some(total) = total {
                let progress = u8::try_from((received.saturating_mul(100) / total).min(100))
                    .unwrap_or(100);
                if progress != last_progress {
                    last_progress = progress;
                    self.publish_progress(progress);
                }
            }
        }

        self.write_with_timeout(file.flush(), path).await?;
        Ok(received)
    }

    async fn write_with_timeout<F>(&self, write: F, path: &Path) -> Result<(), UpdateError>
    where
        F: std::future::Future<Output = std::io::Result<()>>,
    {
        match tokio::time::timeout(self.write_timeout, write).await {
            Ok(result) => result.map_err(|e| UpdateError::file_system("write", path, &e)),
            Err(_) => Err(UpdateError::FileSystemError {
                operation: "write".to_string(),
                path: path.display().to_string(),
                reason: format!("timed out after {}s", self.write_timeout.as_secs()),
            }),
        }
    }

    fn publish_progress(&self, progress: u8) {
        self.state.send_if_modified(|state| match state {
            DownloadState::Downloading { progress: current } if *current != progress => {
                *current = progress;
                true
            }
            _ => false,
        });
    }

    /// Publish the terminal state of attempt `id`.
    ///
    /// Runs under the attempt lock so a concurrent `cancel` either lands before
    /// (and turns the outcome into `Cancelled`) or finds no active attempt.
    fn finish(&self, id: u64, cancel: &CancellationToken, outcome: Outcome) {
        let mut active = self.lock_active();
        if active.as_ref().map(|a| a.id) != Some(id) {
            return;
        }

        let outcome = if cancel.is_cancelled() { Outcome::Cancelled } else { outcome };

        let state = match outcome {
            Outcome::Complete => {
                info!("Download #{id} complete: {}", self.artifact_path.display());
                DownloadState::Complete {
                    artifact_path: self.artifact_path.clone(),
                }
            }
            Outcome::Cancelled => {
                self.remove_artifact();
                info!("Download #{id} cancelled");
                DownloadState::Cancelled
            }
            Outcome::ValidationFailed(failure) => {
                self.remove_artifact();
                self.record_failure(failure.into())
            }
            // The partial file stays until the next attempt replaces it.
            Outcome::TransferFailed(error) => self.record_failure(error),
        };

        *active = None;
        self.state.send_replace(state);
    }

    fn remove_artifact(&self) {
        match std::fs::remove_file(&self.artifact_path) {
            Ok(()) => debug!("Removed artifact {}", self.artifact_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {e}", self.artifact_path.display()),
        }
    }
}
