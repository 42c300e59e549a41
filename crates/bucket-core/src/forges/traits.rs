use async_trait::async_trait;
use bucket_schema::ReleaseAsset;
use std::collections::BTreeMap;

use crate::repo::{GalleryKey, RepoKey};

/// Repository metadata needed to build a package record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMetadata {
    pub name: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub license_spdx: Option<String>,
    pub html_url: String,
}

/// A file inside a script gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryFile {
    pub raw_url: String,
    pub description: Option<String>,
}

/// Contents of one gallery, keyed by filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryListing {
    pub html_url: String,
    pub description: Option<String>,
    pub files: BTreeMap<String, GalleryFile>,
}

/// Failure modes a forge must report distinctly.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited by upstream API")]
    RateLimited,

    #[error("network error: {0}")]
    Transient(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Rate limits and network hiccups are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Transient(_))
    }
}

/// A forge that can report a repository's newest release.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Assets of the latest published release. `NotFound` when the
    /// repository has no release (or does not exist).
    async fn latest_release(&self, key: &RepoKey) -> Result<Vec<ReleaseAsset>, FetchError>;

    /// Name, description, homepage, license and web URL of the repository.
    async fn repo_metadata(&self, key: &RepoKey) -> Result<RepoMetadata, FetchError>;

    /// Remaining API quota as last reported by the forge, if known.
    fn rate_limit_remaining(&self) -> Option<u64> {
        None
    }
}

/// A forge hosting script galleries.
#[async_trait]
pub trait GallerySource: Send + Sync {
    /// List every file of a gallery.
    async fn gallery_files(&self, key: &GalleryKey) -> Result<GalleryListing, FetchError>;
}
