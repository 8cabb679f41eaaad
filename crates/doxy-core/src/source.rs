//! Source acquisition: fetch, verify, unpack and patch the upstream tree.

use std::path::{Path, PathBuf};

use reqwest::Client;

use doxy_schema::RecipeConfig;

use crate::error::RecipeError;
use crate::io::download::DownloadRequest;
use crate::io::extract::{self, ArchiveFormat};
use crate::patch;
use crate::reporter::Reporter;
use crate::resolver;

/// Directory the source tree ends up in, relative to the work directory.
pub const SOURCE_SUBFOLDER: &str = "source_subfolder";

const SOURCE_ARCHIVE: &str = "source.zip";

/// Download the versioned source zip into `workdir`, unpack it as
/// `<workdir>/source_subfolder` and apply the built-in patches followed by
/// `config.extra_patches`.
///
/// A checksum mismatch aborts before anything is extracted.
///
/// # Errors
///
/// Download, checksum, extraction and patch failures are all fatal.
pub async fn acquire_source<R: Reporter + ?Sized>(
    config: &RecipeConfig,
    workdir: &Path,
    client: &Client,
    reporter: &R,
) -> Result<PathBuf, RecipeError> {
    let url = resolver::source_url(&config.source_base_url, &config.version);
    let archive = workdir.join(SOURCE_ARCHIVE);
    let target = workdir.join(SOURCE_SUBFOLDER);
    std::fs::create_dir_all(workdir)?;

    let label = format!("doxygen {} source", config.version);
    DownloadRequest::new(client, &url, &archive, reporter)
        .with_expected_hash(&config.source_sha256)
        .with_label(&label)
        .execute()
        .await?;
    reporter.done(&label, "verified");

    // Stale tree from an earlier run
    if target.exists() {
        std::fs::remove_dir_all(&target)?;
    }

    reporter.extracting(&label);
    let unpacked = extract::extract(&archive, ArchiveFormat::Zip, workdir);
    std::fs::remove_file(&archive).ok();
    unpacked?;

    let top = workdir.join(resolver::source_dir_name(&config.version));
    std::fs::rename(&top, &target).map_err(|e| {
        RecipeError::Io(std::io::Error::new(
            e.kind(),
            format!("{} missing from source archive: {e}", top.display()),
        ))
    })?;

    let mut records = patch::builtin_patches();
    records.extend(config.extra_patches.iter().cloned());
    let applied = patch::apply_all(&target, &records)?;
    tracing::info!(applied, source = %target.display(), "source tree patched");

    Ok(target)
}
