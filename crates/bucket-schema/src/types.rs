//! Manifest records and the assets they are selected from.

use crate::hash::Sha256Digest;
use crate::platform::PlatformId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One downloadable file attached to an upstream release.
///
/// Produced by a release fetcher and read-only to the selection logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// Filename as published by the vendor (e.g. `ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz`).
    pub filename: String,
    /// Direct download URL.
    pub download_url: String,
    /// Size reported by the forge, in bytes.
    pub size_bytes: u64,
    /// Digest reported by the forge, when it publishes one.
    pub digest: Option<Sha256Digest>,
}

impl ReleaseAsset {
    /// Convenience constructor for an asset without a known digest.
    pub fn new(filename: impl Into<String>, download_url: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            filename: filename.into(),
            download_url: download_url.into(),
            size_bytes,
            digest: None,
        }
    }
}

/// The winning download for one platform of one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformBinding {
    /// HTTPS download URL.
    pub url: String,
    /// Size of the download in bytes (always positive).
    pub size: u64,
    /// Lowercase hex SHA256 of the download, when the forge reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Score used while choosing between competing assets. Not persisted.
    #[serde(skip)]
    pub variant_priority: u8,
}

/// A package entry in the bucket manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Unique package name (the upstream repository name).
    pub name: String,
    /// Short description; empty when upstream has none.
    #[serde(default)]
    pub description: String,
    /// Upstream repository URL (`https://github.com/owner/repo`).
    pub repo: String,
    /// Project homepage, if upstream declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// SPDX license identifier, if upstream declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// One download per platform, ordered by platform identifier.
    pub platforms: BTreeMap<PlatformId, PlatformBinding>,
}

/// Interpreter family of a gallery script, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    /// `.ps1`
    Powershell,
    /// `.sh`, `.bash`
    Bash,
    /// `.bat`, `.cmd`
    Batch,
    /// `.py`
    Python,
}

impl ScriptType {
    /// Every script type, in declaration order.
    pub const ALL: [Self; 4] = [Self::Powershell, Self::Bash, Self::Batch, Self::Python];

    /// Classify a filename by its extension (case-insensitive).
    ///
    /// ```
    /// use bucket_schema::ScriptType;
    ///
    /// assert_eq!(ScriptType::from_filename("setup.PS1"), Some(ScriptType::Powershell));
    /// assert_eq!(ScriptType::from_filename("notes.md"), None);
    /// ```
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = std::path::Path::new(filename)
            .extension()?
            .to_str()?
            .to_lowercase();
        match ext.as_str() {
            "ps1" => Some(Self::Powershell),
            "sh" | "bash" => Some(Self::Bash),
            "bat" | "cmd" => Some(Self::Batch),
            "py" => Some(Self::Python),
            _ => None,
        }
    }

    /// Lowercase name as written to the manifest.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Powershell => "powershell",
            Self::Bash => "bash",
            Self::Batch => "batch",
            Self::Python => "python",
        }
    }
}

impl std::fmt::Display for ScriptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A script entry discovered in a gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    /// Script name (file stem).
    pub name: String,
    /// Short description; empty when the gallery has none.
    #[serde(default)]
    pub description: String,
    /// Raw download URL of the script file.
    pub url: String,
    /// Interpreter family.
    pub script_type: ScriptType,
    /// Web page of the gallery the script came from.
    pub source_url: String,
}

/// The published bucket index.
///
/// Created fresh on every generation run and written once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Packages in source-list order.
    pub packages: Vec<PackageRecord>,
    /// Scripts in gallery-list order; omitted from JSON when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<ScriptRecord>,
    /// Generation time (UTC).
    #[serde(rename = "last_updated", with = "utc_seconds")]
    pub generated_at: DateTime<Utc>,
}

impl Manifest {
    /// Assemble a manifest stamped with the current time.
    pub fn new(packages: Vec<PackageRecord>, scripts: Vec<ScriptRecord>) -> Self {
        Self {
            packages,
            scripts,
            generated_at: Utc::now(),
        }
    }

    /// Total number of platform bindings across all packages.
    pub fn binding_count(&self) -> usize {
        self.packages.iter().map(|p| p.platforms.len()).sum()
    }
}

/// ISO-8601 with second precision and a `Z` suffix, e.g. `2024-05-01T12:00:00Z`.
mod utc_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(dt))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Render a timestamp the way manifests store it.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
