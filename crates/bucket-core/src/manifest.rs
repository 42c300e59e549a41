//! Writing manifest files.

use bucket_schema::Manifest;
use std::io::Write;
use std::path::Path;

/// Errors raised while persisting a manifest.
#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write `manifest` as pretty JSON, atomically.
///
/// The document goes to a temporary file next to `path` and is renamed over
/// it only once fully flushed, so an interrupted run never leaves a partial
/// manifest behind.
///
/// # Errors
///
/// Returns [`ManifestError`] if serialization, the temp file, or the final
/// rename fails.
pub fn write_atomic(manifest: &Manifest, path: &Path) -> Result<(), ManifestError> {
    let json = serde_json::to_string_pretty(manifest)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucket_schema::{PackageRecord, PlatformBinding, PlatformId};
    use std::collections::BTreeMap;

    #[test]
    fn writes_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");

        let mut platforms = BTreeMap::new();
        platforms.insert(
            PlatformId::WINDOWS_X86_64,
            PlatformBinding {
                url: "https://example.com/a.zip".into(),
                size: 7,
                checksum: None,
                variant_priority: 0,
            },
        );
        let manifest = Manifest::new(
            vec![PackageRecord {
                name: "a".into(),
                description: "ünïcode".into(),
                repo: "https://github.com/o/a".into(),
                homepage: None,
                license: None,
                platforms,
            }],
            Vec::new(),
        );

        write_atomic(&manifest, &path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("ünïcode"));
        assert!(!raw.contains("\"scripts\""));

        let back: Manifest = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.packages, manifest.packages);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "stale").unwrap();

        write_atomic(&Manifest::new(Vec::new(), Vec::new()), &path).unwrap();
        let back: Manifest = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(back.packages.is_empty());
    }
}
