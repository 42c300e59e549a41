pub mod builder;
pub mod config;
pub mod forges;
pub mod manifest;
pub mod repo;
pub mod selector;
pub mod sources;
pub mod validator;

pub mod reporter;

pub use builder::{BuildOutcome, BuildSummary, ManifestBuilder, SkipReason, SkippedSource};
pub use config::{ConfigError, FetchConfig};
pub use forges::{FetchError, GitHubClient};
pub use repo::{GalleryKey, RepoKey};
pub use reporter::{NullReporter, Reporter};
pub use validator::{ValidateError, ValidationReport};

/// User Agent string for API requests
pub const USER_AGENT: &str = concat!("bucket-core/", env!("CARGO_PKG_VERSION"));
