use anyhow::Result;
use crossterm::style::Stylize;
use serde::Serialize;
use std::path::Path;

use doxy_core::package_id::package_id;
use doxy_core::resolver;

use crate::PlatformArgs;
use crate::config;

#[derive(Debug, Serialize)]
struct Resolved {
    platform: String,
    version: String,
    package_id: String,
    build_from_source: bool,
    archive: String,
    binary_url: String,
    source_url: String,
}

/// Print what `install` would fetch for the selected platform.
pub fn resolve(config_path: Option<&Path>, args: &PlatformArgs, json: bool) -> Result<()> {
    let config = config::load(config_path, args)?;
    let platform = config::platform(args);
    let resolution = resolver::resolve(&platform, &config)?;

    let resolved = Resolved {
        platform: platform.to_string(),
        package_id: package_id(&platform, &config.version, config.build_from_source),
        version: config.version,
        build_from_source: config.build_from_source,
        archive: resolution.file_name,
        binary_url: resolution.binary_url,
        source_url: resolution.source_url,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    let row = |key: &str, value: &str| println!("  {} {value}", format!("{key:<12}").dark_grey());
    row("platform", &resolved.platform);
    row("version", &resolved.version);
    row("package id", &resolved.package_id);
    row("mode", if resolved.build_from_source { "source" } else { "prebuilt" });
    row("archive", &resolved.archive);
    row("binary url", &resolved.binary_url);
    row("source url", &resolved.source_url);
    Ok(())
}
