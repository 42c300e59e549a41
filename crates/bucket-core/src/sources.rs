//! Source list files.
//!
//! One entry per line; blank lines and `#` comments are ignored. Lines that
//! do not parse are kept as [`SourceLine::Invalid`] so the builder can warn
//! about them and move on instead of aborting the run.

use crate::repo::{GalleryKey, RepoKey};
use std::path::Path;

/// Failure to read a source list at all.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// The file does not exist.
    #[error("Source file '{0}' not found")]
    NotFound(String),

    /// The file exists but could not be read.
    #[error("Failed to read source file '{path}': {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// One non-comment line of a source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLine<K> {
    /// A line that parsed into a reference.
    Valid(K),
    /// A line that did not; carries the raw text.
    Invalid(String),
}

/// Read the meaningful lines of a source file, in order.
///
/// # Errors
///
/// Returns [`SourceError::NotFound`] when the file is missing and
/// [`SourceError::Io`] for any other read failure.
pub fn read_lines(path: &Path) -> Result<Vec<String>, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound(path.display().to_string())
        } else {
            SourceError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })?;
    Ok(meaningful_lines(&content))
}

fn meaningful_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Parse repository lines (`https://github.com/o/r` or `o/r`).
pub fn parse_repositories(content: &str) -> Vec<SourceLine<RepoKey>> {
    meaningful_lines(content)
        .into_iter()
        .map(|line| match RepoKey::parse(&line) {
            Some(key) => SourceLine::Valid(key),
            None => SourceLine::Invalid(line),
        })
        .collect()
}

/// Parse gallery lines (gist URLs or ids).
pub fn parse_galleries(content: &str) -> Vec<SourceLine<GalleryKey>> {
    meaningful_lines(content)
        .into_iter()
        .map(|line| match GalleryKey::parse(&line) {
            Some(key) => SourceLine::Valid(key),
            None => SourceLine::Invalid(line),
        })
        .collect()
}

/// Load and parse a repository list from disk.
///
/// # Errors
///
/// See [`read_lines`].
pub fn load_repositories(path: &Path) -> Result<Vec<SourceLine<RepoKey>>, SourceError> {
    Ok(parse_repositories(&read_lines(path)?.join("\n")))
}

/// Load and parse a gallery list from disk.
///
/// # Errors
///
/// See [`read_lines`].
pub fn load_galleries(path: &Path) -> Result<Vec<SourceLine<GalleryKey>>, SourceError> {
    Ok(parse_galleries(&read_lines(path)?.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blanks() {
        let parsed = parse_repositories(
            "# tools\n\nhttps://github.com/sharkdp/bat\n   \n  # indented comment\nBurntSushi/ripgrep\n",
        );
        assert_eq!(
            parsed,
            vec![
                SourceLine::Valid(RepoKey::new("sharkdp", "bat")),
                SourceLine::Valid(RepoKey::new("BurntSushi", "ripgrep")),
            ]
        );
    }

    #[test]
    fn keeps_invalid_lines_in_order() {
        let parsed = parse_repositories("sharkdp/fd\nhttps://gitlab.com/x/y\njunegunn/fzf");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1], SourceLine::Invalid("https://gitlab.com/x/y".into()));
    }

    #[test]
    fn galleries() {
        let parsed = parse_galleries("https://gist.github.com/alice/abc123def\n# x\n???");
        assert_eq!(parsed[0], SourceLine::Valid(GalleryKey::new("abc123def")));
        assert_eq!(parsed[1], SourceLine::Invalid("???".into()));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_lines(Path::new("/definitely/not/here/repositories.txt")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repositories.txt");
        std::fs::write(&path, "sharkdp/fd\n").unwrap();
        let parsed = load_repositories(&path).unwrap();
        assert_eq!(parsed, vec![SourceLine::Valid(RepoKey::new("sharkdp", "fd"))]);
    }
}
