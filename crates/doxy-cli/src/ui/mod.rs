//! Terminal output for the `doxy` binary.

pub mod output;
pub mod theme;

pub use output::ConsoleReporter;
