//! Shared types for doxy.
//!
//! Pure data: nothing in this crate touches the network or the filesystem.

pub mod artifact;
pub mod hash;
pub mod platform;
pub mod recipe;

// Re-exports
pub use artifact::*;
pub use hash::*;
pub use platform::*;
pub use recipe::*;

/// Name of the packaged program.
pub const PACKAGE_NAME: &str = "doxygen";
