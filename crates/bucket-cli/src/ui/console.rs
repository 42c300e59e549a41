//! Line-oriented console reporter.
//!
//! Progress goes to stdout; warnings and errors go to stderr so that a
//! redirected run still surfaces problems.

use bucket_core::Reporter;
use crossterm::style::Stylize;

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        println!();
        println!("{}", title.cyan());
        println!("{}", "─".repeat(40).dark_grey());
    }

    fn source_started(&self, index: usize, total: usize, source: &str) {
        println!(
            "  {} {}",
            format!("[{index}/{total}]").dark_grey(),
            source.white()
        );
    }

    fn source_done(&self, name: &str, detail: &str) {
        println!("        {} {} {}", "✓".green(), name, detail.dark_grey());
    }

    fn source_skipped(&self, source: &str, reason: &str) {
        println!(
            "        {} {} {}",
            "⊘".yellow(),
            source.dark_grey(),
            format!("({reason})").yellow()
        );
    }

    fn info(&self, msg: &str) {
        println!("  {} {msg}", "ℹ".blue());
    }

    fn warning(&self, msg: &str) {
        eprintln!("  {} {msg}", "⚠".yellow());
    }

    fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".red());
    }
}
