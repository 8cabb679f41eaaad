//! Reporter trait for dependency injection
//!
//! The pipeline reports progress through this trait so it is not coupled
//! to a specific terminal implementation. Diagnostics that only matter when
//! debugging go through `tracing` instead.

pub trait Reporter: Send + Sync {
    /// A new pipeline stage has started (e.g. "Fetching", "Packaging").
    fn section(&self, title: &str);

    /// Updates the progress of a download.
    fn downloading(&self, label: &str, current: u64, total: Option<u64>);

    /// An archive is being unpacked.
    fn extracting(&self, label: &str);

    /// A stage finished successfully.
    fn done(&self, label: &str, detail: &str);

    /// A stage failed with a specific reason.
    fn failed(&self, label: &str, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn downloading(&self, label: &str, current: u64, total: Option<u64>) {
        (**self).downloading(label, current, total);
    }
    fn extracting(&self, label: &str) {
        (**self).extracting(label);
    }
    fn done(&self, label: &str, detail: &str) {
        (**self).done(label, detail);
    }
    fn failed(&self, label: &str, reason: &str) {
        (**self).failed(label, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
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
    fn downloading(&self, _: &str, _: u64, _: Option<u64>) {}
    fn extracting(&self, _: &str) {}
    fn done(&self, _: &str, _: &str) {}
    fn failed(&self, _: &str, _: &str) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}
