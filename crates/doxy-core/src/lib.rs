pub mod builder;
pub mod env;
pub mod error;
pub mod io;
pub mod package;
pub mod package_id;
pub mod patch;
pub mod paths;
pub mod recipe;
pub mod relinker;
pub mod resolver;
pub mod selftest;
pub mod source;

pub mod reporter;

pub use error::{ErrorKind, RecipeError};
pub use paths::*;
pub use recipe::{Outcome, Recipe};
pub use reporter::{NullReporter, Reporter};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("doxy-core/", env!("CARGO_PKG_VERSION"));
