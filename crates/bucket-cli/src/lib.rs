//! bucket - package bucket manifest tooling
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Builds a `manifest.json` describing the latest prebuilt binaries of a
//! list of GitHub projects (plus optional gist script galleries), and checks
//! existing manifests for structural problems.

pub mod cmd;
pub mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bucket")]
#[command(author, version, about = "bucket - generate and validate package bucket manifests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch latest releases and write a manifest
    Generate {
        /// File listing GitHub repositories, one per line
        #[arg(short, long, default_value = "repositories.txt")]
        sources: PathBuf,
        /// File listing gist script galleries, one per line
        #[arg(short, long, default_value = "galleries.txt")]
        galleries: PathBuf,
        /// Output manifest path
        #[arg(short, long, default_value = "manifest.json")]
        output: PathBuf,
        /// GitHub API token
        #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Fetch settings (TOML with a [fetch] table)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check a manifest for errors and warnings
    Validate {
        /// Manifest to validate
        #[arg(default_value = "manifest.json")]
        manifest: PathBuf,
    },
}
