use anyhow::Result;
use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uplift_cli::test_utils::{package_bytes, release_json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IDENTITY: &str = "dev.example.app";

/// Isolated configuration directory with a fixed release and local preferences.
struct CliEnv {
    temp: TempDir,
}

impl CliEnv {
    fn new(release: &serde_json::Value) -> Result<Self> {
        let temp = TempDir::new()?;
        std::fs::write(temp.path().join("release.json"), serde_json::to_string_pretty(release)?)?;

        let dir = temp.path().display();
        let config = format!(
            r#"[update]
app_identity = "{IDENTITY}"
min_package_size = 1024
fixed_release_file = '{dir}/release.json'
preferences_path = '{dir}/preferences.json'
download_dir = '{dir}/downloads'
install_command = ["uplift-test-installer-that-does-not-exist", "{{path}}"]
"#
        );
        std::fs::write(temp.path().join("config.toml"), config)?;
        Ok(Self {
            temp,
        })
    }

    fn config_path(&self) -> PathBuf {
        self.temp.path().join("config.toml")
    }

    fn path(&self) -> &Path {
        self.temp.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("uplift").expect("uplift binary is built");
        cmd.arg("--config").arg(self.config_path()).arg("--no-progress");
        cmd.env("HOME", self.temp.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

fn package_release(tag: &str, url: &str) -> serde_json::Value {
    release_json(tag, false, &[("uplift.zip", url)])
}

/// `check` reports a newer fixed release.
#[test]
fn test_check_reports_update() -> Result<()> {
    let env = CliEnv::new(&package_release("v2.0.0", "https://dl.example.com/uplift.zip"))?;

    env.cmd()
        .args(["check", "--current", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Update available: 1.0.0 -> v2.0.0"))
        .stdout(predicate::str::contains("Changes in v2.0.0"));

    let prefs = std::fs::read_to_string(env.path().join("preferences.json"))?;
    assert!(prefs.contains("last_update_check"));
    Ok(())
}

/// `check` reports up to date when the running version is newer.
#[test]
fn test_check_up_to_date() -> Result<()> {
    let env = CliEnv::new(&package_release("v2.0.0", "https://dl.example.com/uplift.zip"))?;

    env.cmd()
        .args(["check", "--current", "v2.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You are on the latest version (v2.0.0)"));
    Ok(())
}

/// A skipped version is hidden from `check` and shown by `status`.
#[test]
fn test_skip_and_status() -> Result<()> {
    let env = CliEnv::new(&package_release("v2.0.0", "https://dl.example.com/uplift.zip"))?;

    env.cmd()
        .args(["skip", "v2.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("will not be offered again"));

    env.cmd()
        .args(["check", "--current", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("latest version"));

    env.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped version:   v2.0.0"))
        .stdout(predicate::str::contains("dev.example.app"));

    env.cmd().args(["skip", "--clear"]).assert().success();

    env.cmd()
        .args(["check", "--current", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Update available"));
    Ok(())
}

/// Preference commands work when the release source is unavailable.
#[test]
fn test_preference_commands_without_release_source() -> Result<()> {
    let env = CliEnv::new(&package_release("v2.0.0", "https://dl.example.com/uplift.zip"))?;
    std::fs::remove_file(env.path().join("release.json"))?;

    env.cmd().args(["skip", "v2.0.0"]).assert().success();
    env.cmd().args(["checks", "disable"]).assert().success();
    env.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped version:   v2.0.0"));
    env.cmd().args(["skip", "--clear"]).assert().success();

    env.cmd().args(["check", "--current", "1.0.0"]).assert().failure();
    Ok(())
}

/// Disabling checks makes `check --if-due` a no-op.
#[test]
fn test_checks_toggle() -> Result<()> {
    let env = CliEnv::new(&package_release("v2.0.0", "https://dl.example.com/uplift.zip"))?;

    env.cmd().args(["checks", "disable"]).assert().success();
    env.cmd()
        .args(["check", "--if-due", "--current", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not due"));

    env.cmd().args(["checks", "enable"]).assert().success();
    env.cmd()
        .args(["check", "--if-due", "--current", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Update available"));

    // The check just ran, so the interval has not elapsed.
    env.cmd()
        .args(["check", "--if-due", "--current", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not due"));
    Ok(())
}

/// A release without a package points at its release page.
#[test]
fn test_update_release_page_only() -> Result<()> {
    let env = CliEnv::new(&release_json("v2.0.0", false, &[]))?;

    env.cmd()
        .args(["update", "--current", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com/releases/v2.0.0"));
    Ok(())
}

/// `update` downloads and validates the package; `--install` fails without an installer.
#[tokio::test(flavor = "multi_thread")]
async fn test_update_downloads_package() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uplift.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(package_bytes(IDENTITY, 4096)?))
        .mount(&server)
        .await;

    let env = CliEnv::new(&package_release("v2.0.0", &format!("{}/uplift.zip", server.uri())))?;
    let artifact = env.path().join("downloads").join("update.zip");

    let mut cmd = env.cmd();
    cmd.args(["update", "--current", "1.0.0"]);
    let assert = tokio::task::spawn_blocking(move || cmd.output()).await??.assert();
    assert.success().stdout(predicate::str::contains("Package ready"));
    assert!(artifact.exists());

    let mut cmd = env.cmd();
    cmd.args(["download", &format!("{}/uplift.zip", server.uri()), "--install"]);
    let assert = tokio::task::spawn_blocking(move || cmd.output()).await??.assert();
    assert
        .failure()
        .stderr(predicate::str::contains("not permitted"))
        .stderr(predicate::str::contains("install_command"));
    Ok(())
}

/// A failed download exits non-zero with the cause and a matching suggestion.
#[tokio::test(flavor = "multi_thread")]
async fn test_download_failure_exit_code() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let env = CliEnv::new(&package_release("v2.0.0", "https://dl.example.com/uplift.zip"))?;
    let mut cmd = env.cmd();
    cmd.args(["download", &format!("{}/gone.zip", server.uri())]);

    let assert = tokio::task::spawn_blocking(move || cmd.output()).await??.assert();
    assert
        .failure()
        .stderr(predicate::str::contains("failed with HTTP 404"))
        .stderr(predicate::str::contains("no longer exists"));
    Ok(())
}

/// A package that fails validation names the failed check and suggests a retry.
#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_package_suggests_retry() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/other.zip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(package_bytes("com.other.app", 4096)?),
        )
        .mount(&server)
        .await;

    let env = CliEnv::new(&package_release("v2.0.0", "https://dl.example.com/uplift.zip"))?;
    let artifact = env.path().join("downloads").join("update.zip");
    let mut cmd = env.cmd();
    cmd.args(["download", &format!("{}/other.zip", server.uri())]);

    let assert = tokio::task::spawn_blocking(move || cmd.output()).await??.assert();
    assert
        .failure()
        .stderr(predicate::str::contains("identity-matches"))
        .stderr(predicate::str::contains("Retry the download"));
    assert!(!artifact.exists());
    Ok(())
}

/// An invalid configuration file is reported with a suggestion.
#[test]
fn test_invalid_config() -> Result<()> {
    let env = CliEnv::new(&package_release("v2.0.0", "https://dl.example.com/uplift.zip"))?;
    std::fs::write(env.config_path(), "[update\nrepo_owner = ")?;

    env.cmd()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML"));
    Ok(())
}
