//! `bucket generate`
use anyhow::{Context, Result};
use bucket_core::forges::GitHubClient;
use bucket_core::sources::{self, SourceError};
use bucket_core::{FetchConfig, ManifestBuilder, Reporter};
use std::path::Path;
use std::process::ExitCode;

use crate::ui::ConsoleReporter;
use crate::ui::summary::print_build_summary;

/// Fetch every listed source and write the manifest to `output`.
pub async fn generate(
    sources_path: &Path,
    galleries_path: &Path,
    output: &Path,
    token: Option<String>,
    config_path: Option<&Path>,
) -> Result<ExitCode> {
    let reporter = ConsoleReporter::new();

    let config = match config_path {
        Some(path) => FetchConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FetchConfig::default(),
    }
    .with_token(token);

    if config.token.is_none() {
        reporter.warning("No GitHub token set; unauthenticated requests are limited to 60/hour");
    }

    let repos = sources::load_repositories(sources_path).context("Failed to load package sources")?;

    let galleries = match sources::load_galleries(galleries_path) {
        Ok(galleries) => galleries,
        Err(SourceError::NotFound(path)) => {
            reporter.warning(&format!("Gallery file '{path}' not found, skipping scripts"));
            Vec::new()
        }
        Err(e) => return Err(e).context("Failed to load gallery sources"),
    };

    tracing::info!(
        "generating from {} repositories and {} galleries",
        repos.len(),
        galleries.len()
    );

    let client = GitHubClient::new(config)?;
    let outcome = ManifestBuilder::new(&client, &client, &reporter)
        .build(&repos, &galleries)
        .await;

    bucket_core::manifest::write_atomic(&outcome.manifest, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_build_summary(&outcome.summary, output);
    Ok(ExitCode::SUCCESS)
}
