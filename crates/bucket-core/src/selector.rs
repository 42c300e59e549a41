//! Artifact selection: one winning asset per platform.
//!
//! Linux assets compete on libc variant (`musl` > `gnu` > unspecified) and
//! the first-seen asset keeps ties. Other platforms have no variant concept:
//! the last asset classified to a platform overwrites any earlier one.

use bucket_schema::{PlatformBinding, PlatformId, ReleaseAsset, classify};
use std::collections::BTreeMap;

/// An asset whose platform was guessed from an OS-only token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assumption {
    pub filename: String,
    pub platform: PlatformId,
}

/// Result of selecting over one release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub platforms: BTreeMap<PlatformId, PlatformBinding>,
    /// Every fallback classification seen, winning or not, in asset order.
    pub assumptions: Vec<Assumption>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

/// Variant score of a Linux asset; 0 for every other platform.
pub fn variant_priority(platform: PlatformId, filename: &str) -> u8 {
    if !platform.is_linux() {
        return 0;
    }
    let f = filename.to_lowercase();
    if f.contains("musl") {
        3
    } else if f.contains("gnu") {
        2
    } else {
        1
    }
}

/// Pick one binding per platform from a release's assets.
pub fn select(assets: &[ReleaseAsset]) -> Selection {
    let mut selection = Selection::default();

    for asset in assets {
        let Some(classification) = classify(&asset.filename) else {
            tracing::trace!("unclassified asset {}", asset.filename);
            continue;
        };
        let platform = classification.platform();

        if classification.is_assumed() {
            selection.assumptions.push(Assumption {
                filename: asset.filename.clone(),
                platform,
            });
        }

        if asset.size_bytes == 0 {
            tracing::debug!("skipping empty asset {}", asset.filename);
            continue;
        }

        let priority = variant_priority(platform, &asset.filename);
        let candidate = PlatformBinding {
            url: asset.download_url.clone(),
            size: asset.size_bytes,
            checksum: asset.digest.as_ref().map(|d| d.as_str().to_string()),
            variant_priority: priority,
        };

        match selection.platforms.get(&platform) {
            Some(current) if platform.is_linux() && priority <= current.variant_priority => {
                tracing::debug!(
                    "{platform}: keeping {} over {} (priority {} >= {priority})",
                    current.url,
                    asset.filename,
                    current.variant_priority
                );
            }
            _ => {
                tracing::debug!("{platform}: selected {}", asset.filename);
                selection.platforms.insert(platform, candidate);
            }
        }
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> ReleaseAsset {
        ReleaseAsset::new(name, format!("https://github.com/o/r/releases/download/v1/{name}"), 100)
    }

    fn winner(sel: &Selection, id: PlatformId) -> &str {
        sel.platforms[&id].url.rsplit('/').next().unwrap()
    }

    #[test]
    fn test_empty_asset_list() {
        let sel = select(&[]);
        assert!(sel.is_empty());
        assert!(sel.assumptions.is_empty());
    }

    #[test]
    fn test_musl_beats_gnu_in_either_order() {
        let gnu = asset("app-x86_64-unknown-linux-gnu.tar.gz");
        let musl = asset("app-x86_64-unknown-linux-musl.tar.gz");

        let sel = select(&[gnu.clone(), musl.clone()]);
        assert_eq!(sel.platforms.len(), 1);
        assert_eq!(winner(&sel, PlatformId::LINUX_X86_64), musl.filename);
        assert_eq!(sel.platforms[&PlatformId::LINUX_X86_64].variant_priority, 3);

        let sel = select(&[musl.clone(), gnu]);
        assert_eq!(winner(&sel, PlatformId::LINUX_X86_64), musl.filename);
    }

    #[test]
    fn test_gnu_beats_unspecified() {
        let sel = select(&[
            asset("app-linux-amd64.tar.gz"),
            asset("app-x86_64-unknown-linux-gnu.tar.gz"),
        ]);
        assert_eq!(
            winner(&sel, PlatformId::LINUX_X86_64),
            "app-x86_64-unknown-linux-gnu.tar.gz"
        );
    }

    #[test]
    fn test_linux_ties_keep_first_seen() {
        let sel = select(&[asset("app-linux-amd64.tar.gz"), asset("app-linux-x86_64.zip")]);
        assert_eq!(winner(&sel, PlatformId::LINUX_X86_64), "app-linux-amd64.tar.gz");
    }

    #[test]
    fn test_non_linux_last_write_wins() {
        let sel = select(&[
            asset("app-x86_64-pc-windows-msvc.zip"),
            asset("app-x86_64-pc-windows-gnu.zip"),
            asset("app-darwin-arm64.tar.gz"),
            asset("app-aarch64-apple-darwin.zip"),
        ]);
        assert_eq!(
            winner(&sel, PlatformId::WINDOWS_X86_64),
            "app-x86_64-pc-windows-gnu.zip"
        );
        assert_eq!(
            winner(&sel, PlatformId::DARWIN_AARCH64),
            "app-aarch64-apple-darwin.zip"
        );
        assert_eq!(sel.platforms[&PlatformId::WINDOWS_X86_64].variant_priority, 0);
    }

    #[test]
    fn test_skips_checksums_and_sources() {
        let sel = select(&[
            asset("app-x86_64-unknown-linux-musl.tar.gz.sha256"),
            asset("SHA256SUMS"),
            asset("app-1.0.tar.gz"),
        ]);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_fallback_is_reported() {
        let sel = select(&[asset("tool-mac.tar.gz"), asset("tool-win64.zip")]);
        assert_eq!(sel.platforms.len(), 2);
        assert_eq!(
            sel.assumptions,
            vec![Assumption {
                filename: "tool-mac.tar.gz".into(),
                platform: PlatformId::DARWIN_AARCH64,
            }]
        );
    }

    #[test]
    fn test_zero_size_assets_are_ignored() {
        let mut empty = asset("app-linux-amd64.tar.gz");
        empty.size_bytes = 0;
        let sel = select(&[empty]);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_digest_becomes_checksum() {
        let mut a = asset("app-x86_64-apple-darwin.tar.gz");
        a.digest = bucket_schema::Sha256Digest::new(
            "sha256:9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
        )
        .ok();
        let sel = select(&[a]);
        assert_eq!(
            sel.platforms[&PlatformId::DARWIN_X86_64].checksum.as_deref(),
            Some("9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")
        );
    }

    #[test]
    fn test_keys_are_known_platforms() {
        let names = [
            "a-x86_64-unknown-linux-musl.tar.gz",
            "a-aarch64-unknown-linux-gnu.tar.gz",
            "a-armv7-unknown-linux-gnueabihf.tar.gz",
            "a-i686-pc-windows-msvc.zip",
            "a-x86_64-apple-darwin.tar.gz",
            "a-linux.tar.gz",
            "a-x86_64-unknown-freebsd.tar.gz",
        ];
        let assets: Vec<_> = names.iter().map(|n| asset(n)).collect();
        let sel = select(&assets);
        assert!(sel.platforms.keys().all(|k| PlatformId::ALL.contains(k)));
    }
}
