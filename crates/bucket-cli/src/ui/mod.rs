//! Terminal output.

pub mod console;
pub mod summary;

pub use console::ConsoleReporter;
