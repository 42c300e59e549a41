//! `bucket validate`
use anyhow::{Context, Result};
use bucket_core::validator;
use std::path::Path;
use std::process::ExitCode;

use crate::ui::summary::print_validation_report;

/// Validate `manifest`, exiting non-zero when any error is found.
pub fn validate(manifest: &Path) -> Result<ExitCode> {
    let report = validator::validate_file(manifest)
        .with_context(|| format!("Failed to load {}", manifest.display()))?;

    print_validation_report(&report, manifest);

    Ok(if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
