pub mod completions;
pub mod env;
pub mod install;
pub mod resolve;
pub mod test;
