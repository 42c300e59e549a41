//! Forge adapters for code hosting platforms.

/// GitHub REST adapter (releases, repository metadata, gists).
pub mod github;
/// Shared traits and types for forge adapters.
pub mod traits;

pub use github::GitHubClient;
pub use traits::{FetchError, GalleryFile, GalleryListing, GallerySource, ReleaseSource, RepoMetadata};
