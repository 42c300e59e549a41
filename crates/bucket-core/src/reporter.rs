//! Reporter trait for dependency injection
//!
//! This trait allows core logic to report progress and status without
//! being coupled to a specific terminal implementation.

pub trait Reporter: Send + Sync {
    /// Indicates a new section or phase has started (e.g. "Fetching packages").
    fn section(&self, title: &str);

    /// A source is about to be processed (`index` is 1-based).
    fn source_started(&self, index: usize, total: usize, source: &str);

    /// A source produced a record.
    fn source_done(&self, name: &str, detail: &str);

    /// A source was skipped; the run continues.
    fn source_skipped(&self, source: &str, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn source_started(&self, index: usize, total: usize, source: &str) {
        (**self).source_started(index, total, source);
    }
    fn source_done(&self, name: &str, detail: &str) {
        (**self).source_done(name, detail);
    }
    fn source_skipped(&self, source: &str, reason: &str) {
        (**self).source_skipped(source, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn source_started(&self, _: usize, _: usize, _: &str) {}
    fn source_done(&self, _: &str, _: &str) {}
    fn source_skipped(&self, _: &str, _: &str) {}
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}
