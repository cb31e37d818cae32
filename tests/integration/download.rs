use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uplift_cli::core::UpdateError;
use uplift_cli::download::{
    ArtifactValidator, DownloadManager, DownloadState, DownloadTimeouts, ZipPackageInspector,
};
use uplift_cli::test_utils::{init_test_logging, package_bytes};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use uplift_cli::download::ValidationCheck;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IDENTITY: &str = "dev.example.app";
const MIB: usize = 1024 * 1024;

fn manager(dir: &Path) -> Result<DownloadManager> {
    let validator =
        ArtifactValidator::new(MIB as u64, IDENTITY, Arc::new(ZipPackageInspector::default()));
    Ok(DownloadManager::new(dir.join("update.zip"), validator, DownloadTimeouts::default())?)
}

async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET")).and(path(route)).respond_with(response).mount(server).await;
}

/// What a [`partial_body_server`] does after sending part of the body.
#[derive(Clone, Copy)]
enum AfterPartial {
    Stall,
    Close,
}

/// Serve one response that announces `total` bytes but sends only `sent`.
async fn partial_body_server(total: usize, sent: usize, after: AfterPartial) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let headers = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/zip\r\nContent-Length: {total}\r\n\r\n"
        );
        if socket.write_all(headers.as_bytes()).await.is_err() {
            return;
        }
        if socket.write_all(&vec![b'x'; sent]).await.is_err() {
            return;
        }
        let _ = socket.flush().await;

        match after {
            AfterPartial::Stall => tokio::time::sleep(Duration::from_secs(60)).await,
            AfterPartial::Close => drop(socket),
        }
    });

    Ok(format!("http://{addr}/partial.zip"))
}

/// Collect every published state until a terminal one.
async fn collect_states(manager: &DownloadManager) -> Vec<DownloadState> {
    let mut rx = manager.subscribe();
    let mut states = vec![rx.borrow_and_update().clone()];
    while !states.last().is_some_and(DownloadState::is_terminal) {
        if rx.changed().await.is_err() {
            break;
        }
        states.push(rx.borrow_and_update().clone());
    }
    states
}

/// A valid package moves through increasing progress to `Complete`.
#[tokio::test]
async fn test_successful_download() -> Result<()> {
    init_test_logging(None);
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    serve(
        &server,
        "/pkg.zip",
        ResponseTemplate::new(200).set_body_bytes(package_bytes(IDENTITY, 2 * MIB)?),
    )
    .await;

    let manager = manager(temp.path())?;
    let id = manager.download(&format!("{}/pkg.zip", server.uri()))?;
    assert_eq!(id, 1);

    let states = collect_states(&manager).await;

    let mut last = 0u8;
    for state in &states[..states.len() - 1] {
        match state {
            DownloadState::Downloading { progress } => {
                assert!(*progress >= last, "progress went backwards: {states:?}");
                assert!(*progress <= 100);
                last = *progress;
            }
            other => panic!("unexpected intermediate state {other:?}"),
        }
    }

    let artifact = temp.path().join("update.zip");
    assert_eq!(
        states.last(),
        Some(&DownloadState::Complete {
            artifact_path: artifact.clone()
        })
    );
    assert!(artifact.exists());
    assert_eq!(manager.artifact_path(), artifact);
    Ok(())
}

/// Cancelling while the server is slow ends in `Cancelled` with no artifact left.
#[tokio::test]
async fn test_cancel_removes_artifact() -> Result<()> {
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    serve(
        &server,
        "/slow.zip",
        ResponseTemplate::new(200)
            .set_body_bytes(package_bytes(IDENTITY, 2 * MIB)?)
            .set_delay(Duration::from_secs(10)),
    )
    .await;

    let manager = manager(temp.path())?;
    manager.download(&format!("{}/slow.zip", server.uri()))?;
    assert_eq!(manager.state(), DownloadState::Downloading { progress: 0 });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(manager.cancel());
    assert!(!manager.cancel(), "second cancel should be a no-op");

    let state = tokio::time::timeout(Duration::from_secs(5), manager.wait_for_terminal()).await?;
    assert_eq!(state, DownloadState::Cancelled);
    assert!(!temp.path().join("update.zip").exists());
    Ok(())
}

/// Cancelling mid-body removes the partially written artifact.
#[tokio::test]
async fn test_cancel_while_streaming_removes_partial_artifact() -> Result<()> {
    let temp = TempDir::new()?;
    let url = partial_body_server(MIB, 300 * 1024, AfterPartial::Stall).await?;
    let artifact = temp.path().join("update.zip");

    let manager = manager(temp.path())?;
    manager.download(&url)?;

    let mut rx = manager.subscribe();
    let streaming = |state: &DownloadState| {
        matches!(state, DownloadState::Downloading { progress } if *progress > 0)
    };
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(streaming)).await??;
    assert!(artifact.exists(), "partial artifact should be on disk while streaming");

    assert!(manager.cancel());
    let state = tokio::time::timeout(Duration::from_secs(5), manager.wait_for_terminal()).await?;
    assert_eq!(state, DownloadState::Cancelled);
    assert!(!artifact.exists());
    assert!(manager.last_error().is_none());
    Ok(())
}

/// A connection dropped mid-body keeps the partial file until the next attempt.
#[tokio::test]
async fn test_interrupted_transfer_keeps_partial_until_next_attempt() -> Result<()> {
    let server = MockServer::start().await;
    serve(&server, "/missing.zip", ResponseTemplate::new(404)).await;
    let temp = TempDir::new()?;
    let url = partial_body_server(MIB, 300 * 1024, AfterPartial::Close).await?;
    let artifact = temp.path().join("update.zip");

    let manager = manager(temp.path())?;
    manager.download(&url)?;

    let state = tokio::time::timeout(Duration::from_secs(10), manager.wait_for_terminal()).await?;
    assert!(matches!(state, DownloadState::Error { .. }), "got {state:?}");
    assert!(matches!(manager.last_error(), Some(UpdateError::NetworkError { .. })));
    assert!(artifact.exists());

    manager.reset()?;
    manager.download(&format!("{}/missing.zip", server.uri()))?;
    assert!(matches!(manager.wait_for_terminal().await, DownloadState::Error { .. }));
    assert!(!artifact.exists());
    Ok(())
}

/// A second download while one is running is rejected and the first continues.
#[tokio::test]
async fn test_single_flight_and_retry() -> Result<()> {
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    serve(
        &server,
        "/slow.zip",
        ResponseTemplate::new(200)
            .set_body_bytes(package_bytes(IDENTITY, 2 * MIB)?)
            .set_delay(Duration::from_secs(10)),
    )
    .await;
    serve(
        &server,
        "/pkg.zip",
        ResponseTemplate::new(200).set_body_bytes(package_bytes(IDENTITY, 2 * MIB)?),
    )
    .await;

    let manager = manager(temp.path())?;
    let slow = format!("{}/slow.zip", server.uri());
    let fast = format!("{}/pkg.zip", server.uri());

    manager.download(&slow)?;
    let err = manager.download(&fast).unwrap_err();
    assert!(matches!(err, UpdateError::DownloadInProgress));
    assert!(matches!(manager.reset().unwrap_err(), UpdateError::InvalidState { .. }));
    assert!(matches!(manager.state(), DownloadState::Downloading { .. }));

    manager.cancel();
    assert_eq!(manager.wait_for_terminal().await, DownloadState::Cancelled);

    let err = manager.download(&fast).unwrap_err();
    assert!(matches!(err, UpdateError::InvalidState { .. }));

    manager.reset()?;
    assert_eq!(manager.state(), DownloadState::Idle);

    let id = manager.download(&fast)?;
    assert_eq!(id, 2);
    assert!(matches!(manager.wait_for_terminal().await, DownloadState::Complete { .. }));
    Ok(())
}

/// An artifact below the minimum size is rejected and deleted.
#[tokio::test]
async fn test_small_artifact_rejected() -> Result<()> {
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    serve(
        &server,
        "/tiny.zip",
        ResponseTemplate::new(200).set_body_bytes(package_bytes(IDENTITY, 0)?),
    )
    .await;

    let manager = manager(temp.path())?;
    manager.download(&format!("{}/tiny.zip", server.uri()))?;

    match manager.wait_for_terminal().await {
        DownloadState::Error { message } => assert!(message.contains("minimum-size"), "{message}"),
        other => panic!("expected error, got {other:?}"),
    }
    assert!(!temp.path().join("update.zip").exists());
    Ok(())
}

/// A package for another application is rejected and deleted.
#[tokio::test]
async fn test_foreign_package_rejected() -> Result<()> {
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    serve(
        &server,
        "/other.zip",
        ResponseTemplate::new(200).set_body_bytes(package_bytes("com.other.app", 2 * MIB)?),
    )
    .await;

    let manager = manager(temp.path())?;
    manager.download(&format!("{}/other.zip", server.uri()))?;

    match manager.wait_for_terminal().await {
        DownloadState::Error { message } => {
            assert!(message.contains("identity-matches"), "{message}");
        }
        other => panic!("expected error, got {other:?}"),
    }
    match manager.last_error() {
        Some(UpdateError::Validation(failure)) => {
            assert_eq!(failure.check, ValidationCheck::IdentityMatches);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(!temp.path().join("update.zip").exists());
    Ok(())
}

/// An HTML error page served with 200 fails the parse check.
#[tokio::test]
async fn test_non_package_body_rejected() -> Result<()> {
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    let mut page = b"<html><body>".to_vec();
    page.resize(2 * MIB, b' ');
    serve(&server, "/page.zip", ResponseTemplate::new(200).set_body_bytes(page)).await;

    let manager = manager(temp.path())?;
    manager.download(&format!("{}/page.zip", server.uri()))?;

    match manager.wait_for_terminal().await {
        DownloadState::Error { message } => {
            assert!(message.contains("package-parseable"), "{message}");
        }
        other => panic!("expected error, got {other:?}"),
    }
    Ok(())
}

/// An HTTP error ends in `Error`, and the stale artifact from an earlier attempt is gone.
#[tokio::test]
async fn test_http_error_and_stale_artifact() -> Result<()> {
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    serve(&server, "/missing.zip", ResponseTemplate::new(404)).await;

    let artifact = temp.path().join("update.zip");
    std::fs::write(&artifact, b"left over from a previous attempt")?;

    let manager = manager(temp.path())?;
    manager.download(&format!("{}/missing.zip", server.uri()))?;

    match manager.wait_for_terminal().await {
        DownloadState::Error { message } => assert!(message.contains("404"), "{message}"),
        other => panic!("expected error, got {other:?}"),
    }
    assert!(!artifact.exists());
    Ok(())
}

/// Clones share one session.
#[tokio::test]
async fn test_clones_share_state() -> Result<()> {
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    serve(
        &server,
        "/slow.zip",
        ResponseTemplate::new(200)
            .set_body_bytes(package_bytes(IDENTITY, MIB)?)
            .set_delay(Duration::from_secs(10)),
    )
    .await;

    let manager = manager(temp.path())?;
    let observer = manager.clone();
    manager.download(&format!("{}/slow.zip", server.uri()))?;

    assert!(matches!(observer.state(), DownloadState::Downloading { .. }));
    assert!(observer.cancel());
    assert_eq!(manager.wait_for_terminal().await, DownloadState::Cancelled);
    Ok(())
}
