//! End-of-run summaries for `generate` and `validate`.

use bucket_core::{BuildSummary, ValidationReport};
use crossterm::style::Stylize;
use std::fmt::Write as _;
use std::path::Path;

fn label(name: &str) -> String {
    format!("{:<18}", format!("{name}:"))
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Platform coverage as aligned `platform  count` rows, then one line of script counts.
pub fn coverage_lines(summary: &BuildSummary) -> Vec<String> {
    let width = summary
        .platform_coverage
        .keys()
        .map(|p| p.to_string().len())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = summary
        .platform_coverage
        .iter()
        .map(|(platform, count)| format!("{:<width$}  {count}", platform.to_string()))
        .collect();

    if !summary.script_coverage.is_empty() {
        let mut scripts = String::new();
        for (i, (kind, count)) in summary.script_coverage.iter().enumerate() {
            if i > 0 {
                scripts.push_str(", ");
            }
            let _ = write!(scripts, "{kind} {count}");
        }
        lines.push(format!("scripts: {scripts}"));
    }
    lines
}

pub fn print_build_summary(summary: &BuildSummary, output: &Path) {
    println!();
    println!("{}", "Summary".cyan());
    println!("{}", "─".repeat(40).dark_grey());
    println!(
        "  {} {}",
        label("Packages").dark_grey(),
        format!(
            "{} of {} repositories ({} platform binaries)",
            summary.packages, summary.repositories, summary.bindings
        )
        .white()
    );
    if summary.galleries > 0 {
        println!(
            "  {} {}",
            label("Scripts").dark_grey(),
            format!("{} from {} galleries", summary.scripts, summary.galleries).white()
        );
    }
    if !summary.skipped.is_empty() {
        println!(
            "  {} {}",
            label("Skipped").dark_grey(),
            format!("{} source{}", summary.skipped.len(), plural(summary.skipped.len())).yellow()
        );
        for skipped in &summary.skipped {
            println!(
                "                     {} {} {}",
                "└─".dark_grey(),
                skipped.source.as_str().white(),
                skipped.reason.to_string().dark_grey()
            );
        }
    }
    if summary.assumptions > 0 {
        println!(
            "  {} {}",
            label("Assumed").dark_grey(),
            format!(
                "{} asset{} without architecture",
                summary.assumptions,
                plural(summary.assumptions)
            )
            .yellow()
        );
    }
    if summary.unrecognized_scripts > 0 {
        println!(
            "  {} {}",
            label("Unrecognized").dark_grey(),
            format!("{} gallery files", summary.unrecognized_scripts).yellow()
        );
    }

    let coverage = coverage_lines(summary);
    if !coverage.is_empty() {
        println!("  {}", label("Coverage").dark_grey());
        for line in coverage {
            println!("      {line}");
        }
    }

    println!(
        "  {} {}",
        label("Written").dark_grey(),
        output.display().to_string().green()
    );
    println!();
}

pub fn print_validation_report(report: &ValidationReport, path: &Path) {
    println!();
    println!("{} {}", "Validating".cyan(), path.display());
    println!("{}", "─".repeat(40).dark_grey());

    if !report.errors.is_empty() {
        println!();
        println!(
            "{}",
            format!("{} error{}:", report.errors.len(), plural(report.errors.len())).red()
        );
        for error in &report.errors {
            println!("   • {error}");
        }
    }

    if !report.warnings.is_empty() {
        println!();
        println!(
            "{}",
            format!("{} warning{}:", report.warnings.len(), plural(report.warnings.len())).yellow()
        );
        for warning in &report.warnings {
            println!("   • {warning}");
        }
    }

    println!();
    if report.is_valid() {
        println!("{}", "Manifest is valid".green());
    } else {
        println!("{}", "Manifest is invalid".red());
    }
    println!(
        "   • {} package{}, {} platform binaries, {} script{}",
        report.package_count,
        plural(report.package_count),
        report.binding_count,
        report.script_count,
        plural(report.script_count)
    );
    println!();
}
