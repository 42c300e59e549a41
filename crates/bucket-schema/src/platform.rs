//! Platform identifiers and release-asset filename classification.
//!
//! Vendors name their release assets inconsistently (`darwin`/`macos`/`osx`,
//! `aarch64`/`arm64`, `x86_64`/`amd64`/`x64`, target triples, ...). This module
//! folds those spellings into a closed set of [`PlatformId`]s using one
//! ordered rule table, with a separate lower-confidence fallback tier for
//! assets that only name an operating system.

use regex::RegexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::LazyLock;

/// Operating system half of a [`PlatformId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Os {
    /// Linux-based operating systems (glibc or musl).
    Linux,
    /// macOS, named after its kernel as most release pipelines do.
    Darwin,
    /// Microsoft Windows.
    Windows,
    /// FreeBSD.
    FreeBsd,
}

impl Os {
    /// Canonical lowercase token used in platform identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
            Self::FreeBsd => "freebsd",
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture half of a [`PlatformId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
    /// Intel/AMD 64-bit.
    X86_64,
    /// ARM 64-bit.
    Aarch64,
    /// ARMv7 hard-float.
    Armv7,
    /// ARMv6 (Raspberry Pi 1/Zero class devices).
    Armv6,
    /// Intel 32-bit.
    I686,
}

impl Arch {
    /// Canonical lowercase token used in platform identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
            Self::Armv7 => "armv7",
            Self::Armv6 => "armv6",
            Self::I686 => "i686",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A build target in `{os}-{arch}` form, e.g. `linux-x86_64`.
///
/// Only the combinations listed in [`PlatformId::ALL`] can be constructed, so
/// every identifier that reaches a manifest is a known one.
///
/// # Example
///
/// ```
/// use bucket_schema::PlatformId;
///
/// let id: PlatformId = "darwin-aarch64".parse().unwrap();
/// assert_eq!(id, PlatformId::DARWIN_AARCH64);
/// assert_eq!(id.to_string(), "darwin-aarch64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformId {
    os: Os,
    arch: Arch,
}

impl PlatformId {
    /// 64-bit Windows.
    pub const WINDOWS_X86_64: Self = Self::new(Os::Windows, Arch::X86_64);
    /// Windows on ARM.
    pub const WINDOWS_AARCH64: Self = Self::new(Os::Windows, Arch::Aarch64);
    /// 32-bit Windows.
    pub const WINDOWS_I686: Self = Self::new(Os::Windows, Arch::I686);
    /// 64-bit Linux.
    pub const LINUX_X86_64: Self = Self::new(Os::Linux, Arch::X86_64);
    /// 64-bit ARM Linux.
    pub const LINUX_AARCH64: Self = Self::new(Os::Linux, Arch::Aarch64);
    /// ARMv7 Linux.
    pub const LINUX_ARMV7: Self = Self::new(Os::Linux, Arch::Armv7);
    /// ARMv6 Linux.
    pub const LINUX_ARMV6: Self = Self::new(Os::Linux, Arch::Armv6);
    /// 32-bit Linux.
    pub const LINUX_I686: Self = Self::new(Os::Linux, Arch::I686);
    /// Intel macOS.
    pub const DARWIN_X86_64: Self = Self::new(Os::Darwin, Arch::X86_64);
    /// Apple Silicon macOS.
    pub const DARWIN_AARCH64: Self = Self::new(Os::Darwin, Arch::Aarch64);
    /// 64-bit FreeBSD.
    pub const FREEBSD_X86_64: Self = Self::new(Os::FreeBsd, Arch::X86_64);

    /// The closed set of supported targets.
    pub const ALL: [Self; 11] = [
        Self::WINDOWS_X86_64,
        Self::WINDOWS_AARCH64,
        Self::WINDOWS_I686,
        Self::LINUX_X86_64,
        Self::LINUX_AARCH64,
        Self::LINUX_ARMV7,
        Self::LINUX_ARMV6,
        Self::LINUX_I686,
        Self::DARWIN_X86_64,
        Self::DARWIN_AARCH64,
        Self::FREEBSD_X86_64,
    ];

    const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Operating system component.
    pub fn os(&self) -> Os {
        self.os
    }

    /// Architecture component.
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// Whether this target is a Linux one (the only OS with libc variants).
    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }
}

impl std::fmt::Display for PlatformId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Error returned when a string is not one of the known platform identifiers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown platform: {0}")]
pub struct PlatformParseError(pub String);

impl std::str::FromStr for PlatformId {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.to_string() == wanted)
            .ok_or_else(|| PlatformParseError(s.to_string()))
    }
}

impl Serialize for PlatformId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlatformId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Outcome of classifying one asset filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// An OS and architecture pattern both matched.
    Matched(PlatformId),
    /// Only an OS token matched; the architecture is the per-OS default.
    /// Callers must surface these so operators can audit them.
    Assumed(PlatformId),
}

impl Classification {
    /// The platform this asset was assigned to.
    pub fn platform(&self) -> PlatformId {
        match self {
            Self::Matched(id) | Self::Assumed(id) => *id,
        }
    }

    /// True when the platform came from the fallback tier.
    pub fn is_assumed(&self) -> bool {
        matches!(self, Self::Assumed(_))
    }
}

/// Archive and installer extensions an asset must end with to be considered.
pub const ARCHIVE_EXTENSIONS: &[&str] = &[
    ".tar.gz", ".tgz", ".zip", ".tar.xz", ".tar.bz2", ".exe", ".msi",
];

/// Ordered exact-match table. The first platform with any matching
/// alternative wins, so ambiguous names resolve to the earlier row.
const EXACT_RULES: &[(PlatformId, &[&str])] = &[
    (
        PlatformId::WINDOWS_X86_64,
        &[
            r"windows.*(x86_64|amd64|x64)",
            r"(x86_64|amd64|x64).*windows",
            r"(^|[^a-z])win64",
            r"x86_64-pc-windows-(msvc|gnu)",
        ],
    ),
    (
        PlatformId::WINDOWS_AARCH64,
        &[r"windows.*(aarch64|arm64)", r"(aarch64|arm64).*windows"],
    ),
    (
        PlatformId::WINDOWS_I686,
        &[
            r"windows.*(i686|i386|x86\b)",
            r"(i686|i386|x86\b).*windows",
            r"(^|[^a-z])win32",
            r"i686-pc-windows-(msvc|gnu)",
        ],
    ),
    (
        PlatformId::LINUX_X86_64,
        &[
            r"linux.*(x86_64|amd64|x64)",
            r"(x86_64|amd64|x64).*linux",
            r"x86_64-unknown-linux-(gnu|musl)",
        ],
    ),
    (
        PlatformId::LINUX_AARCH64,
        &[r"linux.*(aarch64|arm64)", r"(aarch64|arm64).*linux"],
    ),
    (
        PlatformId::LINUX_ARMV7,
        &[r"linux.*(armv7|armhf)", r"(armv7|armhf).*linux"],
    ),
    (
        PlatformId::LINUX_ARMV6,
        &[r"linux.*armv6", r"armv6.*linux", r"(^|[^a-z])arm-unknown-linux-"],
    ),
    (
        PlatformId::LINUX_I686,
        &[r"linux.*(i686|i386|x86\b)", r"(i686|i386|x86\b).*linux"],
    ),
    (
        PlatformId::DARWIN_X86_64,
        &[
            r"(darwin|macos|osx|apple).*(x86_64|amd64|x64)",
            r"(x86_64|amd64|x64).*(darwin|macos|osx|apple)",
        ],
    ),
    (
        PlatformId::DARWIN_AARCH64,
        &[
            r"(darwin|macos|osx|apple).*(aarch64|arm64)",
            r"(aarch64|arm64).*(darwin|macos|osx|apple)",
        ],
    ),
    (
        PlatformId::FREEBSD_X86_64,
        &[
            r"freebsd.*(x86_64|amd64|x64)",
            r"(x86_64|amd64|x64).*freebsd",
        ],
    ),
];

/// OS-only tokens, each anchored at a token boundary, with the architecture
/// assumed when nothing more specific matched.
const FALLBACK_RULES: &[(PlatformId, &str)] = &[
    (PlatformId::WINDOWS_X86_64, r"(^|[-_. ])(win|windows)([-_. ]|$)"),
    (PlatformId::LINUX_X86_64, r"(^|[-_. ])linux([-_. ]|$)"),
    (
        PlatformId::DARWIN_AARCH64,
        r"(^|[-_. ])(mac|macos|osx|darwin)([-_. ]|$)",
    ),
];

static EXACT_TABLE: LazyLock<Vec<(PlatformId, RegexSet)>> = LazyLock::new(|| {
    EXACT_RULES
        .iter()
        .map(|(id, patterns)| {
            let set = RegexSet::new(*patterns).expect("platform patterns are valid regexes");
            (*id, set)
        })
        .collect()
});

static FALLBACK_TABLE: LazyLock<Vec<(PlatformId, RegexSet)>> = LazyLock::new(|| {
    FALLBACK_RULES
        .iter()
        .map(|(id, pattern)| {
            let set = RegexSet::new([*pattern]).expect("fallback patterns are valid regexes");
            (*id, set)
        })
        .collect()
});

/// Whether `filename` ends with one of [`ARCHIVE_EXTENSIONS`] (case-insensitive).
pub fn has_archive_extension(filename: &str) -> bool {
    let f = filename.to_lowercase();
    ARCHIVE_EXTENSIONS.iter().any(|ext| f.ends_with(ext))
}

/// Classify a release-asset filename.
///
/// Returns `None` for checksums, signatures, source tarballs without a
/// platform token, and anything else that is not a recognised archive or
/// installer.
///
/// # Example
///
/// ```
/// use bucket_schema::{classify, Classification, PlatformId};
///
/// assert_eq!(
///     classify("tool-win64.zip"),
///     Some(Classification::Matched(PlatformId::WINDOWS_X86_64))
/// );
/// assert_eq!(
///     classify("tool-mac.tar.gz"),
///     Some(Classification::Assumed(PlatformId::DARWIN_AARCH64))
/// );
/// assert_eq!(classify("tool-linux-amd64.tar.gz.sha256"), None);
/// ```
pub fn classify(filename: &str) -> Option<Classification> {
    if !has_archive_extension(filename) {
        return None;
    }
    let f = filename.to_lowercase();

    if let Some((id, _)) = EXACT_TABLE.iter().find(|(_, set)| set.is_match(&f)) {
        return Some(Classification::Matched(*id));
    }

    FALLBACK_TABLE
        .iter()
        .find(|(_, set)| set.is_match(&f))
        .map(|(id, _)| Classification::Assumed(*id))
}
