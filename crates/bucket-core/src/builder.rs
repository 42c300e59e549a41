//! Manifest generation.
//!
//! Walks every configured source in input order, one at a time. A failure on
//! one source is reported and skipped; it never aborts the run, so the
//! resulting manifest holds every source that succeeded.

use bucket_schema::{Manifest, PackageRecord, PlatformId, ScriptRecord, ScriptType};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::forges::{FetchError, GalleryListing, GallerySource, ReleaseSource};
use crate::repo::{GalleryKey, RepoKey};
use crate::reporter::Reporter;
use crate::selector::select;
use crate::sources::SourceLine;

/// How often (in repositories) the remaining API quota is reported.
const RATE_LIMIT_REPORT_EVERY: usize = 10;

/// Why a source contributed nothing to the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The line is not a recognisable repository or gallery reference.
    InvalidSource,
    /// Repository, release or gallery does not exist.
    NotFound,
    /// The API refused access.
    PermissionDenied,
    /// Any other fetch failure, including exhausted retries.
    FetchFailed(String),
    /// The latest release has no asset for a known platform.
    NoUsableAssets,
    /// An earlier source already produced a package with this name.
    DuplicateName(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSource => f.write_str("invalid source reference"),
            Self::NotFound => f.write_str("not found"),
            Self::PermissionDenied => f.write_str("permission denied"),
            Self::FetchFailed(e) => write!(f, "fetch failed: {e}"),
            Self::NoUsableAssets => f.write_str("no binary assets for a known platform"),
            Self::DuplicateName(name) => write!(f, "duplicate package name '{name}'"),
        }
    }
}

impl From<FetchError> for SkipReason {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::NotFound(_) => Self::NotFound,
            FetchError::PermissionDenied(_) => Self::PermissionDenied,
            other => Self::FetchFailed(other.to_string()),
        }
    }
}

/// A skipped source and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub source: String,
    pub reason: SkipReason,
}

/// Operator-facing statistics. Not part of the persisted manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub repositories: usize,
    pub galleries: usize,
    pub packages: usize,
    /// Platform bindings across all accepted packages.
    pub bindings: usize,
    pub scripts: usize,
    pub skipped: Vec<SkippedSource>,
    pub unrecognized_scripts: usize,
    pub assumptions: usize,
    pub platform_coverage: BTreeMap<PlatformId, usize>,
    pub script_coverage: BTreeMap<ScriptType, usize>,
}

/// The manifest plus what happened while building it.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub manifest: Manifest,
    pub summary: BuildSummary,
}

/// Drives the selector across every source.
pub struct ManifestBuilder<'a> {
    releases: &'a dyn ReleaseSource,
    galleries: &'a dyn GallerySource,
    reporter: &'a dyn Reporter,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(
        releases: &'a dyn ReleaseSource,
        galleries: &'a dyn GallerySource,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            releases,
            galleries,
            reporter,
        }
    }

    /// Process all repositories, then all galleries, and assemble the manifest.
    pub async fn build(
        &self,
        repos: &[SourceLine<RepoKey>],
        galleries: &[SourceLine<GalleryKey>],
    ) -> BuildOutcome {
        let mut summary = BuildSummary {
            repositories: repos.len(),
            galleries: galleries.len(),
            ..BuildSummary::default()
        };

        let packages = self.build_packages(repos, &mut summary).await;
        let scripts = self.build_scripts(galleries, &mut summary).await;

        let manifest = Manifest::new(packages, scripts);
        summary.packages = manifest.packages.len();
        summary.bindings = manifest.binding_count();
        summary.scripts = manifest.scripts.len();

        BuildOutcome { manifest, summary }
    }

    async fn build_packages(
        &self,
        repos: &[SourceLine<RepoKey>],
        summary: &mut BuildSummary,
    ) -> Vec<PackageRecord> {
        let mut packages = Vec::new();
        let mut seen_names = HashSet::new();

        if !repos.is_empty() {
            self.reporter.section("Fetching package information");
        }

        for (i, line) in repos.iter().enumerate() {
            let label = line_label(line);
            self.reporter.source_started(i + 1, repos.len(), &label);

            let result = match line {
                SourceLine::Valid(key) => self.package_record(key, summary).await,
                SourceLine::Invalid(_) => Err(SkipReason::InvalidSource),
            };

            match result {
                Ok(record) if !seen_names.insert(record.name.clone()) => {
                    self.skip(summary, label, SkipReason::DuplicateName(record.name));
                }
                Ok(record) => {
                    for platform in record.platforms.keys() {
                        *summary.platform_coverage.entry(*platform).or_default() += 1;
                    }
                    self.reporter.source_done(
                        &record.name,
                        &format!("{} platforms", record.platforms.len()),
                    );
                    packages.push(record);
                }
                Err(reason) => self.skip(summary, label, reason),
            }

            if (i + 1) % RATE_LIMIT_REPORT_EVERY == 0 {
                if let Some(remaining) = self.releases.rate_limit_remaining() {
                    self.reporter
                        .info(&format!("Rate limit: {remaining} requests remaining"));
                }
            }
        }

        packages
    }

    async fn package_record(
        &self,
        key: &RepoKey,
        summary: &mut BuildSummary,
    ) -> Result<PackageRecord, SkipReason> {
        let meta = self.releases.repo_metadata(key).await?;
        let assets = self.releases.latest_release(key).await?;
        tracing::debug!("{key}: {} assets in latest release", assets.len());

        let selection = select(&assets);
        for assumption in &selection.assumptions {
            summary.assumptions += 1;
            self.reporter.warning(&format!(
                "{key}: assumed {} for '{}' (no architecture in filename)",
                assumption.platform, assumption.filename
            ));
        }

        if selection.is_empty() {
            return Err(SkipReason::NoUsableAssets);
        }

        Ok(PackageRecord {
            name: meta.name,
            description: meta.description.unwrap_or_default(),
            repo: meta.html_url,
            homepage: meta.homepage,
            license: meta.license_spdx,
            platforms: selection.platforms,
        })
    }

    async fn build_scripts(
        &self,
        galleries: &[SourceLine<GalleryKey>],
        summary: &mut BuildSummary,
    ) -> Vec<ScriptRecord> {
        let mut scripts = Vec::new();

        if !galleries.is_empty() {
            self.reporter.section("Fetching script galleries");
        }

        for (i, line) in galleries.iter().enumerate() {
            let label = line_label(line);
            self.reporter.source_started(i + 1, galleries.len(), &label);

            let SourceLine::Valid(key) = line else {
                self.skip(summary, label, SkipReason::InvalidSource);
                continue;
            };

            match self.galleries.gallery_files(key).await {
                Ok(listing) => {
                    let found = self.collect_scripts(key, &listing, summary);
                    self.reporter
                        .source_done(&label, &format!("{} scripts", found.len()));
                    scripts.extend(found);
                }
                Err(e) => self.skip(summary, label, e.into()),
            }
        }

        scripts
    }

    fn collect_scripts(
        &self,
        key: &GalleryKey,
        listing: &GalleryListing,
        summary: &mut BuildSummary,
    ) -> Vec<ScriptRecord> {
        let mut found = Vec::new();
        for (filename, file) in &listing.files {
            let Some(script_type) = ScriptType::from_filename(filename) else {
                summary.unrecognized_scripts += 1;
                self.reporter.warning(&format!(
                    "{key}: skipping '{filename}' (unrecognized script type)"
                ));
                continue;
            };

            let name = Path::new(filename)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(filename)
                .to_string();

            *summary.script_coverage.entry(script_type).or_default() += 1;
            found.push(ScriptRecord {
                name,
                description: file
                    .description
                    .clone()
                    .or_else(|| listing.description.clone())
                    .unwrap_or_default(),
                url: file.raw_url.clone(),
                script_type,
                source_url: listing.html_url.clone(),
            });
        }
        found
    }

    fn skip(&self, summary: &mut BuildSummary, source: String, reason: SkipReason) {
        tracing::warn!("skipping {source}: {reason}");
        self.reporter.source_skipped(&source, &reason.to_string());
        summary.skipped.push(SkippedSource { source, reason });
    }
}

fn line_label<K: std::fmt::Display>(line: &SourceLine<K>) -> String {
    match line {
        SourceLine::Valid(key) => key.to_string(),
        SourceLine::Invalid(raw) => raw.clone(),
    }
}
