//! Release metadata and the sources that provide it.
//!
//! A [`ReleaseSource`] lists every published release of a repository, newest
//! or not, including drafts and prereleases; filtering is the checker's job.
//!
//! - [`GitHubReleaseSource`] queries `GET {api}/repos/{owner}/{repo}/releases`
//! - [`FixedReleaseSource`] returns a fixed list without touching the network,
//!   used by tests and by the `update.fixed_release_file` override

use crate::constants::user_agent;
use crate::core::UpdateError;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Media type requested from the GitHub REST API.
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// A published release as reported by the release API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Version tag, e.g. `v1.2.3`.
    #[serde(rename = "tag_name")]
    pub tag: String,
    /// Human-readable release title.
    #[serde(rename = "name", default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Web page describing the release.
    #[serde(rename = "html_url")]
    pub release_page_url: String,
    /// Release notes, if any.
    #[serde(rename = "body", default)]
    pub notes: Option<String>,
    /// Downloadable files attached to the release.
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Marked as a prerelease by the publisher.
    #[serde(rename = "prerelease", default)]
    pub is_prerelease: bool,
    /// Not yet published.
    #[serde(rename = "draft", default)]
    pub is_draft: bool,
}

/// A file attached to a [`Release`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// File name, e.g. `uplift-1.2.3.zip`.
    pub name: String,
    /// Direct download URL.
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

// GitHub sends `"name": null` for releases created without a title.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Provider of release metadata for a repository.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// List all releases of `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns an error when the transport fails, the server answers with a
    /// non-success status, or the payload cannot be decoded.
    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, UpdateError>;
}

/// Release source backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubReleaseSource {
    client: Client,
    api_base_url: String,
}

impl GitHubReleaseSource {
    /// Create a source for `api_base_url` (e.g. `https://api.github.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        api_base_url: impl Into<String>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, UpdateError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let client = Client::builder()
            .user_agent(user_agent())
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()
            .map_err(|e| UpdateError::network("client setup", &e))?;

        Ok(Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn releases_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{owner}/{repo}/releases", self.api_base_url)
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleaseSource {
    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, UpdateError> {
        let url = self.releases_url(owner, repo);
        debug!("Fetching releases from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpdateError::network("release fetch", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| UpdateError::network("release fetch", &e))?;

        let releases: Vec<Release> =
            serde_json::from_str(&body).map_err(|e| UpdateError::ParseError {
                what: "release list".to_string(),
                reason: e.to_string(),
            })?;

        debug!("Received {} releases for {owner}/{repo}", releases.len());
        Ok(releases)
    }
}

/// Release source that always answers with the same list.
#[derive(Debug, Clone, Default)]
pub struct FixedReleaseSource {
    releases: Vec<Release>,
}

impl FixedReleaseSource {
    /// Serve `releases` for every repository.
    pub fn new(releases: Vec<Release>) -> Self {
        Self {
            releases,
        }
    }

    /// Load a single release object in API wire format from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not contain a release.
    pub async fn from_file(path: &Path) -> Result<Self, UpdateError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| UpdateError::file_system("read release file", path, &e))?;

        let release: Release =
            serde_json::from_str(&content).map_err(|e| UpdateError::ParseError {
                what: format!("release file {}", path.display()),
                reason: e.to_string(),
            })?;

        Ok(Self::new(vec![release]))
    }
}

#[async_trait]
impl ReleaseSource for FixedReleaseSource {
    async fn list_releases(&self, _owner: &str, _repo: &str) -> Result<Vec<Release>, UpdateError> {
        Ok(self.releases.clone())
    }
}
