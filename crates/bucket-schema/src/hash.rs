//! Validated SHA-256 digests.

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};

/// A validated SHA256 digest (64 lowercase hex characters).
///
/// GitHub reports release-asset digests as `sha256:<hex>`; the prefix is
/// accepted and stripped so manifests only ever carry the bare hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new `Sha256Digest`, validating the input.
    ///
    /// Accepts strings with or without a `sha256:` prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the hex portion is not exactly 64 ASCII hex characters.
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        let hex = s.strip_prefix("sha256:").unwrap_or(&s);

        if hex.len() != 64 {
            anyhow::bail!(
                "Invalid SHA256 digest: expected 64 hex characters, got {} in '{s}'",
                hex.len(),
            );
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("Invalid SHA256 digest: contains non-hex characters in '{s}'");
        }

        Ok(Self(hex.to_lowercase()))
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    #[test]
    fn digest_strips_github_prefix() {
        let d = Sha256Digest::new(format!("sha256:{}", HEX.to_uppercase())).unwrap();
        assert_eq!(d.as_str(), HEX);
    }

    #[test]
    fn digest_rejects_bad_input() {
        assert!(Sha256Digest::new("sha256:abc").is_err());
        assert!(Sha256Digest::new("z".repeat(64)).is_err());
    }

    #[test]
    fn digest_validates_on_deserialize() {
        let ok: Sha256Digest = serde_json::from_str(&format!("\"{HEX}\"")).unwrap();
        assert_eq!(ok.as_str(), HEX);
        assert!(serde_json::from_str::<Sha256Digest>("\"nope\"").is_err());
    }
}
