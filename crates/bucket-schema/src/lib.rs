//! Shared types and wire format for bucket manifests.
//!
//! This crate is pure: it holds the platform table and filename classifier,
//! the manifest records, and nothing that touches the network or disk.

pub mod hash;
pub mod platform;
pub mod types;

// Re-exports
pub use hash::Sha256Digest;
pub use platform::{
    ARCHIVE_EXTENSIONS, Arch, Classification, Os, PlatformId, PlatformParseError, classify,
    has_archive_extension,
};
pub use types::*;
