//! Source references: GitHub repositories and script galleries (gists).

use regex::Regex;
use std::sync::LazyLock;

static GITHUB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?github\.com/([^/\s]+)/([^/\s]+?)(?:\.git)?(?:/.*)?$").expect("valid regex")
});

static GIST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?gist\.github\.com/(?:[^/\s]+/)?([0-9A-Za-z]+)/?(?:[#?].*)?$").expect("valid regex")
});

static GIST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z]{5,}$").expect("valid regex"));

/// A repository key uniquely identifying a GitHub repository
///
/// This newtype eliminates the ambiguity of `(String, String)` tuples
/// and makes the API self-documenting.
///
/// # Example
///
/// ```
/// use bucket_core::repo::RepoKey;
///
/// let key = RepoKey::parse("https://github.com/BurntSushi/ripgrep.git").unwrap();
/// assert_eq!(key.owner, "BurntSushi");
/// assert_eq!(key.repo, "ripgrep");
/// ```
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RepoKey {
    /// Repository owner (GitHub user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoKey {
    /// Create a new `RepoKey` from an owner and repository name.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse a GitHub URL (`https://github.com/o/r`, `github.com/o/r.git`,
    /// `https://github.com/o/r/releases`) or a bare `owner/repo` pair.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(caps) = GITHUB_URL.captures(s) {
            return Some(Self::new(&caps[1], &caps[2]));
        }

        if s.contains("://") || s.contains(char::is_whitespace) {
            return None;
        }
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
                Some(Self::new(owner, repo.trim_end_matches(".git")))
            }
            _ => None,
        }
    }

    /// Canonical web URL for the repository.
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

impl std::fmt::Display for RepoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A script gallery, identified by its gist id.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct GalleryKey(String);

impl GalleryKey {
    /// Wrap a gist id without validation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse a gist URL (`https://gist.github.com/user/<id>`) or a bare id.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(caps) = GIST_URL.captures(s) {
            return Some(Self::new(&caps[1]));
        }
        GIST_ID.is_match(s).then(|| Self::new(s))
    }

    /// The gist id.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GalleryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gist:{}", self.0)
    }
}
