use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uplift_cli::checker::{DownloadTarget, UpdateChecker};
use uplift_cli::prefs::{FilePreferenceStore, PreferenceStore, Preferences};
use uplift_cli::release::GitHubReleaseSource;
use uplift_cli::test_utils::{init_test_logging, release_json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RELEASES_PATH: &str = "/repos/acme/tool/releases";

fn checker_for(server: &MockServer, prefs: Arc<FilePreferenceStore>) -> Result<UpdateChecker> {
    let source =
        GitHubReleaseSource::new(server.uri(), Duration::from_secs(5), Duration::from_secs(5))?;
    Ok(UpdateChecker::new(Arc::new(source), prefs, "acme", "tool"))
}

/// The newest stable release is offered with its package asset.
#[tokio::test]
async fn test_offers_newest_stable_release() -> Result<()> {
    init_test_logging(None);
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    let prefs = Arc::new(FilePreferenceStore::new(temp.path().join("prefs.json")));

    let user_agent = format!("uplift/{}", env!("CARGO_PKG_VERSION"));
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("user-agent", user_agent.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            release_json("v1.4.0", false, &[("tool-1.4.0.zip", "https://dl.example.com/1.4.0")]),
            release_json("v2.0.0-beta.1", true, &[("tool-2.0.0.zip", "https://dl.example.com/2.0")]),
            release_json("v1.10.0", false, &[
                ("checksums.txt", "https://dl.example.com/sums.txt"),
                ("tool-1.10.0.zip", "https://dl.example.com/1.10.0.zip"),
            ]),
            release_json("v1.9.0", false, &[]),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let checker = checker_for(&server, prefs.clone())?;
    let info = checker.check_for_update("v1.2.0").await.expect("update should be offered");

    assert_eq!(info.available_version, "v1.10.0");
    assert_eq!(
        info.download,
        DownloadTarget::DirectArtifact("https://dl.example.com/1.10.0.zip".to_string())
    );
    assert_eq!(info.changelog.as_deref(), Some("Changes in v1.10.0"));

    let stored = prefs.load().await?;
    assert!(stored.last_update_check > 0, "check time should be recorded");
    Ok(())
}

/// A server error is reported as "no update" and does not touch preferences.
#[tokio::test]
async fn test_server_error_yields_none() -> Result<()> {
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    let prefs = Arc::new(FilePreferenceStore::new(temp.path().join("prefs.json")));

    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let checker = checker_for(&server, prefs.clone())?;
    assert!(checker.check_for_update("1.0.0").await.is_none());
    assert_eq!(prefs.load().await?, Preferences::default());
    Ok(())
}

/// Malformed JSON is reported as "no update".
#[tokio::test]
async fn test_malformed_json_yields_none() -> Result<()> {
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    let prefs = Arc::new(FilePreferenceStore::new(temp.path().join("prefs.json")));

    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"message\": \"oops\""))
        .mount(&server)
        .await;

    let checker = checker_for(&server, prefs)?;
    assert!(checker.check_for_update("1.0.0").await.is_none());
    Ok(())
}

/// A skipped release is not offered, and clearing the skip offers it again.
#[tokio::test]
async fn test_skip_then_clear() -> Result<()> {
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    let prefs = Arc::new(FilePreferenceStore::new(temp.path().join("prefs.json")));

    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([release_json(
            "v3.1.0",
            false,
            &[]
        )])))
        .mount(&server)
        .await;

    let checker = checker_for(&server, prefs)?;
    checker.mark_version_skipped("v3.1.0").await?;
    assert!(checker.check_for_update("3.0.0").await.is_none());

    checker.clear_skipped_version().await?;
    let info = checker.check_for_update("3.0.0").await.expect("update after clearing skip");
    assert!(!info.can_auto_download());
    assert_eq!(info.download_url(), "https://example.com/releases/v3.1.0");
    Ok(())
}

/// The check interval gates startup checks based on the stored timestamp.
#[tokio::test]
async fn test_startup_check_is_rate_limited() -> Result<()> {
    let server = MockServer::start().await;
    let temp = TempDir::new()?;
    let prefs = Arc::new(FilePreferenceStore::new(temp.path().join("prefs.json")));

    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([release_json(
            "v1.0.0",
            false,
            &[]
        )])))
        .mount(&server)
        .await;

    let checker = checker_for(&server, prefs)?.with_check_interval(Duration::from_secs(3600));
    assert!(checker.should_check_on_startup().await);

    assert!(checker.check_for_update("1.0.0").await.is_none());
    assert!(!checker.should_check_on_startup().await);

    let last = checker.preferences().await?.last_update_check;
    assert!(checker.should_check_at(last + 3_600_000).await);
    Ok(())
}
