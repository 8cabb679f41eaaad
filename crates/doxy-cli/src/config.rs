//! Recipe configuration loading.
//!
//! Defaults come from [`RecipeConfig::default`]; a `doxy.toml` (given with
//! `--config`, or found in the current directory) is layered on top, then
//! command-line flags.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use doxy_schema::{Platform, RecipeConfig, RecipeFile};

use crate::PlatformArgs;

/// File picked up from the current directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "doxy.toml";

/// Parse a recipe override file.
pub fn load_recipe_file(path: &Path) -> Result<RecipeFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid recipe file {}", path.display()))
}

fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.is_file().then_some(local)
}

/// Defaults, then the config file, then flags.
pub fn load(explicit: Option<&Path>, args: &PlatformArgs) -> Result<RecipeConfig> {
    let mut config = RecipeConfig::default();
    if let Some(path) = discover(explicit) {
        tracing::debug!(path = %path.display(), "loading recipe file");
        config = config.merge(load_recipe_file(&path)?);
    }
    if let Some(version) = &args.version {
        config.version.clone_from(version);
    }
    if args.build_from_source {
        config.build_from_source = true;
    }
    Ok(config)
}

/// Resolve the platform from flags (with their env fallbacks), then the host.
pub fn platform(args: &PlatformArgs) -> Platform {
    let host = Platform::host();
    let os = args.os.unwrap_or(host.os);
    let arch = args.arch.unwrap_or(host.build_arch);

    let mut platform = Platform::new(os, arch);
    if let Some(target) = args.target_arch {
        platform = platform.with_target_arch(target);
    }
    if let Some(compiler) = args.compiler {
        platform = platform.with_compiler(compiler);
    }
    platform
}
