//! Console reporter.
//!
//! Progress goes to stderr so stdout stays clean for `doxy resolve` and
//! `doxy env`, whose output is meant to be captured.

use std::io::{Write, stderr};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::QueueableCommand;
use crossterm::cursor::MoveToColumn;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};

use doxy_core::Reporter;

use super::theme::{Icons, format_progress};

/// Styled terminal implementation of [`Reporter`].
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    quiet: bool,
    icons: Icons,
    /// A download line is being redrawn in place
    progress_open: AtomicBool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            ..Self::default()
        }
    }

    fn close_progress(&self) {
        if self.progress_open.swap(false, Ordering::Relaxed) {
            eprintln!();
        }
    }

    fn line(&self, text: &str) {
        self.close_progress();
        eprintln!("{text}");
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        self.line(&format!("{} {}", self.icons.section.blue(), title.bold()));
    }

    fn downloading(&self, label: &str, current: u64, total: Option<u64>) {
        if self.quiet {
            return;
        }
        let mut err = stderr();
        let _ = err.queue(MoveToColumn(0));
        let _ = err.queue(Clear(ClearType::CurrentLine));
        let _ = write!(
            err,
            "    {} {}",
            label,
            format_progress(current, total).dark_grey()
        );
        let _ = err.flush();
        self.progress_open.store(true, Ordering::Relaxed);

        if total.is_some_and(|t| current >= t && t > 0) {
            self.close_progress();
        }
    }

    fn extracting(&self, label: &str) {
        if self.quiet {
            return;
        }
        self.line(&format!("    {} {}", "unpacking".dark_grey(), label));
    }

    fn done(&self, label: &str, detail: &str) {
        if self.quiet {
            return;
        }
        self.line(&format!(
            "    {} {} {}",
            self.icons.success.green(),
            label,
            detail.dark_grey()
        ));
    }

    fn failed(&self, label: &str, reason: &str) {
        self.line(&format!(
            "    {} {} {}",
            self.icons.error.red(),
            label,
            reason.red()
        ));
    }

    fn info(&self, msg: &str) {
        if self.quiet {
            return;
        }
        self.line(&format!("    {}", msg.dark_grey()));
    }

    fn success(&self, msg: &str) {
        if self.quiet {
            return;
        }
        self.line(&format!("{} {}", self.icons.success.green(), msg.green()));
    }

    fn warning(&self, msg: &str) {
        self.line(&format!("{} {}", self.icons.warning.yellow(), msg.yellow()));
    }

    fn error(&self, msg: &str) {
        self.line(&format!("{} {}", self.icons.error.red(), msg.red()));
    }
}
