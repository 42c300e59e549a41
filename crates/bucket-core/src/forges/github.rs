//! GitHub REST adapter.
//!
//! Calls are strictly sequential: every request first waits out the
//! configured minimum spacing since the previous one, and retryable failures
//! (rate limits, 5xx, connection errors) are retried a fixed number of times
//! with a fixed pause.

use anyhow::Result;
use async_trait::async_trait;
use bucket_schema::{ReleaseAsset, Sha256Digest};
use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Mutex as StdMutex;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::traits::{
    FetchError, GalleryFile, GalleryListing, GallerySource, ReleaseSource, RepoMetadata,
};
use crate::config::FetchConfig;
use crate::repo::{GalleryKey, RepoKey};

#[derive(Debug, Deserialize)]
struct GithubRepo {
    name: String,
    description: Option<String>,
    homepage: Option<String>,
    html_url: String,
    license: Option<GithubLicense>,
}

#[derive(Debug, Deserialize)]
struct GithubLicense {
    spdx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubRelease {
    #[serde(default)]
    assets: Vec<GithubAsset>,
}

#[derive(Debug, Deserialize)]
struct GithubAsset {
    name: String,
    browser_download_url: String,
    size: u64,
    digest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Gist {
    html_url: String,
    description: Option<String>,
    files: BTreeMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    raw_url: String,
}

/// Sequential, throttled GitHub client.
#[derive(Debug)]
pub struct GitHubClient {
    client: Client,
    config: FetchConfig,
    last_request: Mutex<Option<Instant>>,
    rate_limit_remaining: StdMutex<Option<u64>>,
}

impl GitHubClient {
    /// Build a client from configuration. The token, if any, comes from
    /// `config` only.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            last_request: Mutex::new(None),
            rate_limit_remaining: StdMutex::new(None),
        })
    }

    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.config.request_delay {
                tokio::time::sleep(self.config.request_delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn record_rate_limit(&self, headers: &HeaderMap) {
        if let Some(remaining) = header_u64(headers, "x-ratelimit-remaining") {
            if let Ok(mut slot) = self.rate_limit_remaining.lock() {
                *slot = Some(remaining);
            }
        }
    }

    /// GET `path` below the API root and decode the JSON body, retrying
    /// transient failures.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{path}", self.config.api_base);
        let max = self.config.max_retries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.get_once(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < max => {
                    tracing::warn!(
                        "{e} for {url}, retrying in {:?} ({attempt}/{max})",
                        self.config.retry_delay
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) if e.is_retryable() => {
                    return Err(FetchError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        self.throttle().await;

        let mut req = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.config.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;
        self.record_rate_limit(resp.headers());

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status, resp.headers(), url));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| {
            let snippet: String = text.chars().take(200).collect();
            FetchError::Decode {
                url: url.to_string(),
                message: format!("{e}. Snippet: {snippet}"),
            }
        })
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Map a non-success response onto the fetch error taxonomy.
fn status_error(status: StatusCode, headers: &HeaderMap, url: &str) -> FetchError {
    let exhausted = header_u64(headers, "x-ratelimit-remaining") == Some(0);
    let secondary_limit = headers.contains_key("retry-after");

    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound(url.to_string()),
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited,
        StatusCode::FORBIDDEN if exhausted || secondary_limit => FetchError::RateLimited,
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
            FetchError::PermissionDenied(format!("HTTP {} for {url}", status.as_u16()))
        }
        s if s.is_server_error() => {
            FetchError::Transient(format!("HTTP {} for {url}", s.as_u16()))
        }
        s => FetchError::Status {
            status: s.as_u16(),
            url: url.to_string(),
        },
    }
}

/// Empty strings and GitHub's `NOASSERTION` placeholder carry no information.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != "NOASSERTION")
}

#[async_trait]
impl ReleaseSource for GitHubClient {
    async fn latest_release(&self, key: &RepoKey) -> Result<Vec<ReleaseAsset>, FetchError> {
        let release: GithubRelease = self
            .get_json(&format!("/repos/{}/{}/releases/latest", key.owner, key.repo))
            .await?;

        Ok(release
            .assets
            .into_iter()
            .map(|a| ReleaseAsset {
                filename: a.name,
                download_url: a.browser_download_url,
                size_bytes: a.size,
                digest: a.digest.and_then(|d| Sha256Digest::new(d).ok()),
            })
            .collect())
    }

    async fn repo_metadata(&self, key: &RepoKey) -> Result<RepoMetadata, FetchError> {
        let repo: GithubRepo = self
            .get_json(&format!("/repos/{}/{}", key.owner, key.repo))
            .await?;

        Ok(RepoMetadata {
            name: repo.name,
            description: non_empty(repo.description),
            homepage: non_empty(repo.homepage),
            license_spdx: non_empty(repo.license.and_then(|l| l.spdx_id)),
            html_url: repo.html_url,
        })
    }

    fn rate_limit_remaining(&self) -> Option<u64> {
        self.rate_limit_remaining.lock().ok().and_then(|slot| *slot)
    }
}

#[async_trait]
impl GallerySource for GitHubClient {
    async fn gallery_files(&self, key: &GalleryKey) -> Result<GalleryListing, FetchError> {
        let gist: Gist = self.get_json(&format!("/gists/{}", key.id())).await?;

        Ok(GalleryListing {
            html_url: gist.html_url,
            description: non_empty(gist.description),
            files: gist
                .files
                .into_iter()
                .map(|(name, file)| {
                    (
                        name,
                        GalleryFile {
                            raw_url: file.raw_url,
                            description: None,
                        },
                    )
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::time::Duration;

    fn client_for(server: &Server, token: Option<&str>) -> GitHubClient {
        let config = FetchConfig {
            api_base: server.url(),
            request_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..FetchConfig::default()
        }
        .with_token(token.map(str::to_string));
        GitHubClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_latest_release_assets() {
        let mut server = Server::new_async().await;
        let body = r#"{
            "tag_name": "v14.1.0",
            "assets": [
                {
                    "name": "ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz",
                    "browser_download_url": "https://github.com/BurntSushi/ripgrep/releases/download/14.1.0/ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz",
                    "size": 2566310,
                    "digest": "sha256:9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
                },
                {
                    "name": "ripgrep-14.1.0-x86_64-pc-windows-msvc.zip",
                    "browser_download_url": "https://github.com/BurntSushi/ripgrep/releases/download/14.1.0/ripgrep-14.1.0-x86_64-pc-windows-msvc.zip",
                    "size": 1998000,
                    "digest": null
                }
            ]
        }"#;
        let m = server
            .mock("GET", "/repos/BurntSushi/ripgrep/releases/latest")
            .match_header("authorization", "Bearer t0ken")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-ratelimit-remaining", "4999")
            .with_body(body)
            .create_async()
            .await;

        let client = client_for(&server, Some("t0ken"));
        let assets = client
            .latest_release(&RepoKey::new("BurntSushi", "ripgrep"))
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].size_bytes, 2_566_310);
        assert!(assets[0].digest.is_some());
        assert!(assets[1].digest.is_none());
        assert_eq!(client.rate_limit_remaining(), Some(4999));
    }

    #[tokio::test]
    async fn test_repo_metadata_normalises_placeholders() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/sharkdp/fd")
            .with_status(200)
            .with_body(
                r#"{
                    "name": "fd",
                    "description": null,
                    "homepage": "",
                    "html_url": "https://github.com/sharkdp/fd",
                    "license": { "spdx_id": "NOASSERTION" }
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(&server, None);
        let meta = client.repo_metadata(&RepoKey::new("sharkdp", "fd")).await.unwrap();
        assert_eq!(meta.name, "fd");
        assert_eq!(meta.description, None);
        assert_eq!(meta.homepage, None);
        assert_eq!(meta.license_spdx, None);
        assert_eq!(meta.html_url, "https://github.com/sharkdp/fd");
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/repos/ghost/none/releases/latest")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client
            .latest_release(&RepoKey::new("ghost", "none"))
            .await
            .unwrap_err();
        m.assert_async().await;
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_server_errors_exhaust_retries() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/repos/o/r")
            .with_status(502)
            .expect(3)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client.repo_metadata(&RepoKey::new("o", "r")).await.unwrap_err();
        m.assert_async().await;
        match err {
            FetchError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, FetchError::Transient(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_forbidden_with_exhausted_quota_is_rate_limit() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/repos/o/r")
            .with_status(403)
            .with_header("x-ratelimit-remaining", "0")
            .expect(3)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client.repo_metadata(&RepoKey::new("o", "r")).await.unwrap_err();
        m.assert_async().await;
        assert!(matches!(
            err,
            FetchError::RetriesExhausted { ref last, .. } if matches!(**last, FetchError::RateLimited)
        ));
        assert_eq!(client.rate_limit_remaining(), Some(0));
    }

    #[tokio::test]
    async fn test_plain_forbidden_is_permission_denied() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/repos/private/thing")
            .with_status(403)
            .with_header("x-ratelimit-remaining", "41")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client
            .repo_metadata(&RepoKey::new("private", "thing"))
            .await
            .unwrap_err();
        m.assert_async().await;
        assert!(matches!(err, FetchError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_bad_json_is_decode_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/o/r")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client.repo_metadata(&RepoKey::new("o", "r")).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_gist_listing() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/gists/abc123")
            .with_status(200)
            .with_body(
                r#"{
                    "html_url": "https://gist.github.com/alice/abc123",
                    "description": "Handy scripts",
                    "files": {
                        "setup.ps1": { "filename": "setup.ps1", "raw_url": "https://gist.githubusercontent.com/alice/abc123/raw/setup.ps1" },
                        "notes.md": { "filename": "notes.md", "raw_url": "https://gist.githubusercontent.com/alice/abc123/raw/notes.md" }
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(&server, None);
        let listing = client.gallery_files(&GalleryKey::new("abc123")).await.unwrap();
        assert_eq!(listing.description.as_deref(), Some("Handy scripts"));
        assert_eq!(listing.files.len(), 2);
        assert!(listing.files["setup.ps1"].raw_url.ends_with("setup.ps1"));
    }

    #[tokio::test]
    async fn test_requests_are_spaced() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/o/r")
            .with_status(404)
            .expect(2)
            .create_async()
            .await;

        let config = FetchConfig {
            api_base: server.url(),
            request_delay: Duration::from_millis(150),
            retry_delay: Duration::ZERO,
            ..FetchConfig::default()
        };
        let client = GitHubClient::new(config).unwrap();
        let key = RepoKey::new("o", "r");

        let start = std::time::Instant::now();
        let _ = client.repo_metadata(&key).await;
        let _ = client.repo_metadata(&key).await;
        assert!(start.elapsed() >= Duration::from_millis(150));
    }
}
