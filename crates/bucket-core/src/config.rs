//! Fetcher configuration.
//!
//! Defaults match GitHub's unauthenticated etiquette: one request per second,
//! three attempts per call, five seconds between attempts. Any field can be
//! overridden from the `[fetch]` table of a `bucket.toml` file.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default REST API root.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Errors raised while loading a configuration file.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or has wrongly typed fields.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Offending path.
        path: String,
        /// Underlying error.
        source: toml::de::Error,
    },

    /// A value parsed but makes no sense (e.g. zero attempts).
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Settings for the release/gallery fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// API root, without trailing slash.
    pub api_base: String,
    /// Access token; `None` means anonymous requests.
    pub token: Option<String>,
    /// Minimum spacing between two outbound requests.
    pub request_delay: Duration,
    /// Total attempts per call (first try included).
    pub max_retries: u32,
    /// Fixed pause between attempts.
    pub retry_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            token: None,
            request_delay: Duration::from_secs(1),
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
            user_agent: crate::USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    /// Use `token` for authenticated requests. Empty strings are ignored.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Load overrides from a TOML file on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is unreadable, malformed, or sets
    /// `max_retries` to zero.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// Parse overrides from TOML text.
    ///
    /// # Errors
    ///
    /// See [`FetchConfig::from_file`].
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        let mut config = Self::default();
        let fetch = file.fetch;

        if let Some(base) = fetch.api_base {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(ms) = fetch.request_delay_ms {
            config.request_delay = Duration::from_millis(ms);
        }
        if let Some(n) = fetch.max_retries {
            if n == 0 {
                return Err(ConfigError::Invalid("max_retries must be at least 1".into()));
            }
            config.max_retries = n;
        }
        if let Some(ms) = fetch.retry_delay_ms {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = fetch.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ua) = fetch.user_agent {
            config.user_agent = ua;
        }
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    fetch: FetchSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FetchSection {
    api_base: Option<String>,
    request_delay_ms: Option<u64>,
    max_retries: Option<u32>,
    retry_delay_ms: Option<u64>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = FetchConfig::default();
        assert_eq!(c.api_base, "https://api.github.com");
        assert_eq!(c.request_delay, Duration::from_secs(1));
        assert_eq!(c.max_retries, 3);
        assert_eq!(c.retry_delay, Duration::from_secs(5));
        assert_eq!(c.timeout, Duration::from_secs(30));
    }

    #[test]
    fn toml_overrides() {
        let c = FetchConfig::from_toml_str(
            r#"
            [fetch]
            api_base = "https://ghe.example.com/api/v3/"
            request_delay_ms = 250
            max_retries = 5
            "#,
        )
        .unwrap();
        assert_eq!(c.api_base, "https://ghe.example.com/api/v3");
        assert_eq!(c.request_delay, Duration::from_millis(250));
        assert_eq!(c.max_retries, 5);
        assert_eq!(c.retry_delay, Duration::from_secs(5));
    }

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(FetchConfig::from_toml_str("").unwrap(), FetchConfig::default());
    }

    #[test]
    fn rejects_zero_attempts_and_unknown_keys() {
        assert!(matches!(
            FetchConfig::from_toml_str("[fetch]\nmax_retries = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            FetchConfig::from_toml_str("[fetch]\nretries = 2"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn blank_token_is_anonymous() {
        let c = FetchConfig::default().with_token(Some("  ".into()));
        assert_eq!(c.token, None);
        let c = FetchConfig::default().with_token(Some("ghp_x".into()));
        assert_eq!(c.token.as_deref(), Some("ghp_x"));
    }
}
