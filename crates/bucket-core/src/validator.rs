//! Manifest validation.
//!
//! Works on raw JSON rather than the typed [`bucket_schema::Manifest`] so
//! that hand-edited or foreign manifests produce a full list of findings
//! instead of a single deserialization error.

use bucket_schema::{PlatformId, ScriptType};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

const REQUIRED_PACKAGE_FIELDS: &[&str] = &["name", "description", "repo", "platforms"];
const REQUIRED_BINDING_FIELDS: &[&str] = &["url", "size"];
/// `generatedAt` is accepted from older generators.
const TIMESTAMP_KEYS: &[&str] = &["last_updated", "generatedAt"];

/// The manifest could not be loaded at all.
#[derive(thiserror::Error, Debug)]
pub enum ValidateError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Error loading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Findings for one manifest. Errors make it invalid; warnings do not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub package_count: usize,
    pub binding_count: usize,
    pub script_count: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

/// Load and validate the manifest at `path`.
///
/// # Errors
///
/// Returns [`ValidateError`] if the file is missing, unreadable, or not JSON.
/// Problems with the content itself are reported in the [`ValidationReport`].
pub fn validate_file(path: &Path) -> Result<ValidationReport, ValidateError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ValidateError::NotFound(path.display().to_string())
        } else {
            ValidateError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })?;
    let value: Value = serde_json::from_str(&content)?;
    Ok(validate_value(&value))
}

/// Validate an already-parsed manifest document.
pub fn validate_value(doc: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    let (packages, scripts) = match doc {
        Value::Array(packages) => (packages.as_slice(), &[][..]),
        Value::Object(envelope) => match envelope.get("packages") {
            Some(Value::Array(packages)) => {
                let stamped = TIMESTAMP_KEYS
                    .iter()
                    .any(|k| matches!(envelope.get(*k), Some(Value::String(_))));
                if !stamped {
                    report.warn("Missing 'last_updated' timestamp");
                }
                let scripts = match envelope.get("scripts") {
                    None | Some(Value::Null) => &[][..],
                    Some(Value::Array(scripts)) => scripts.as_slice(),
                    Some(_) => {
                        report.error("'scripts' must be an array");
                        &[][..]
                    }
                };
                (packages.as_slice(), scripts)
            }
            _ => return structural_error(report),
        },
        _ => return structural_error(report),
    };

    if packages.is_empty() {
        report.warn("Manifest is empty");
    }

    for (i, package) in packages.iter().enumerate() {
        validate_package(package, i, &mut report);
    }
    for (i, script) in scripts.iter().enumerate() {
        validate_script(script, i, &mut report);
    }
    check_duplicates(packages, &mut report);

    report.package_count = packages.len();
    report.script_count = scripts.len();
    report.binding_count = packages
        .iter()
        .filter_map(|p| p.get("platforms").and_then(Value::as_object))
        .map(Map::len)
        .sum();

    report
}

fn structural_error(mut report: ValidationReport) -> ValidationReport {
    report.error("Manifest must be an array of packages or an object with a 'packages' array");
    report
}

fn record_id(record: &Value, kind: &str, index: usize) -> String {
    match record.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{kind}[{index}]"),
    }
}

fn validate_package(package: &Value, index: usize, report: &mut ValidationReport) {
    let id = record_id(package, "package", index);
    let Some(fields) = package.as_object() else {
        report.error(format!("{id}: Package must be an object"));
        return;
    };

    for field in REQUIRED_PACKAGE_FIELDS {
        if !fields.contains_key(*field) {
            report.error(format!("{id}: Missing required field '{field}'"));
        }
    }

    if let Some(name) = fields.get("name") {
        if !matches!(name, Value::String(s) if !s.is_empty()) {
            report.error(format!("{id}: Invalid name"));
        }
    }

    if let Some(description) = fields.get("description") {
        if !description.is_string() {
            report.error(format!("{id}: Invalid description"));
        }
    }

    match fields.get("repo") {
        Some(Value::String(repo)) if !repo.starts_with("https://github.com/") => {
            report.warn(format!("{id}: Repo URL not from GitHub"));
        }
        Some(Value::String(_)) | None => {}
        Some(_) => report.error(format!("{id}: Invalid repo URL")),
    }

    for optional in ["homepage", "license"] {
        match fields.get(optional) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(_) => report.error(format!("{id}: Invalid {optional}")),
        }
    }

    if let Some(platforms) = fields.get("platforms") {
        validate_platforms(platforms, &id, report);
    }
}

fn validate_platforms(platforms: &Value, id: &str, report: &mut ValidationReport) {
    let Some(platforms) = platforms.as_object() else {
        report.error(format!("{id}: Platforms must be an object"));
        return;
    };
    if platforms.is_empty() {
        report.error(format!("{id}: No platforms defined"));
        return;
    }

    for (platform, binding) in platforms {
        let prefix = format!("{id}/{platform}");
        if platform.parse::<PlatformId>().is_err() {
            report.warn(format!("{prefix}: Unknown platform identifier"));
        }
        validate_binding(binding, &prefix, report);
    }
}

fn validate_binding(binding: &Value, prefix: &str, report: &mut ValidationReport) {
    let Some(fields) = binding.as_object() else {
        report.error(format!("{prefix}: Platform data must be an object"));
        return;
    };

    for field in REQUIRED_BINDING_FIELDS {
        if !fields.contains_key(*field) {
            report.error(format!("{prefix}: Missing '{field}'"));
        }
    }

    match fields.get("url") {
        Some(Value::String(url)) if !url.starts_with("https://") => {
            report.warn(format!("{prefix}: URL not using HTTPS"));
        }
        Some(Value::String(_)) | None => {}
        Some(_) => report.error(format!("{prefix}: Invalid URL")),
    }

    if let Some(size) = fields.get("size") {
        if !matches!(size.as_u64(), Some(n) if n > 0) {
            report.error(format!("{prefix}: Invalid size"));
        }
    }

    if let Some(checksum) = fields.get("checksum") {
        if !checksum.is_string() {
            report.warn(format!("{prefix}: Invalid checksum format"));
        }
    }
}

fn validate_script(script: &Value, index: usize, report: &mut ValidationReport) {
    let id = record_id(script, "script", index);
    let Some(fields) = script.as_object() else {
        report.error(format!("{id}: Script must be an object"));
        return;
    };

    if !matches!(fields.get("name"), Some(Value::String(s)) if !s.is_empty()) {
        report.error(format!("{id}: Invalid name"));
    }

    match fields.get("url") {
        Some(Value::String(url)) if !url.starts_with("https://") => {
            report.warn(format!("{id}: URL not using HTTPS"));
        }
        Some(Value::String(_)) => {}
        _ => report.error(format!("{id}: Invalid URL")),
    }

    let known = fields
        .get("script_type")
        .and_then(Value::as_str)
        .is_some_and(|t| ScriptType::ALL.iter().any(|k| k.as_str() == t));
    if !known {
        report.error(format!("{id}: Invalid script_type"));
    }
}

fn check_duplicates(packages: &[Value], report: &mut ValidationReport) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen = Vec::new();
    for name in packages
        .iter()
        .filter_map(|p| p.get("name").and_then(Value::as_str))
    {
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            first_seen.push(name);
        }
        *count += 1;
    }
    for name in first_seen.into_iter().filter(|n| counts[n] > 1) {
        report.error(format!("Duplicate package name: {name}"));
    }
}
