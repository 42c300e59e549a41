//! bucket - package bucket manifest tooling

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use bucket_cli::cmd;
use bucket_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let run = async {
        match cli.command {
            Commands::Generate {
                sources,
                galleries,
                output,
                token,
                config,
            } => cmd::generate::generate(&sources, &galleries, &output, token, config.as_deref()).await,
            Commands::Validate { manifest } => cmd::validate::validate(&manifest),
        }
    };

    tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted");
            Ok(ExitCode::FAILURE)
        }
    }
}
