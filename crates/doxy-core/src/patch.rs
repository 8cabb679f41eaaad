//! Declarative source patching.
//!
//! Upstream's CMake setup needs two adjustments before it configures cleanly
//! out of tree. Each adjustment is a [`PatchRecord`]: the anchor must be
//! present in the file, and every occurrence is replaced. A missing anchor
//! means upstream changed under us, so it is an error rather than a no-op.

use std::path::{Path, PathBuf};

use thiserror::Error;

use doxy_schema::PatchRecord;

/// Name of the CMake include written by the builder next to the source tree.
pub const TOOLCHAIN_INCLUDE: &str = "doxy_toolchain.cmake";

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("cannot patch {}: {source}", file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("anchor {anchor:?} not found in {}", file.display())]
    AnchorNotFound { file: PathBuf, anchor: String },
}

/// Patches applied to every extracted source tree, in order.
pub fn builtin_patches() -> Vec<PatchRecord> {
    vec![
        PatchRecord::new(
            "CMakeLists.txt",
            "include(version)",
            r#"include("${CMAKE_CURRENT_SOURCE_DIR}/cmake/version.cmake")"#,
        ),
        PatchRecord::new(
            "CMakeLists.txt",
            "project(doxygen)",
            format!(
                "project(doxygen)\ninclude(\"${{CMAKE_CURRENT_SOURCE_DIR}}/../{TOOLCHAIN_INCLUDE}\")"
            ),
        ),
    ]
}

/// Apply one record under `root`.
///
/// # Errors
///
/// Returns [`PatchError::AnchorNotFound`] without touching the file when the
/// anchor is absent, or [`PatchError::Io`] on read/write failure.
pub fn apply(root: &Path, record: &PatchRecord) -> Result<(), PatchError> {
    let file = root.join(&record.file);
    let io_err = |source| PatchError::Io {
        file: file.clone(),
        source,
    };

    let content = std::fs::read_to_string(&file).map_err(io_err)?;
    if !content.contains(&record.anchor) {
        return Err(PatchError::AnchorNotFound {
            file: record.file.clone(),
            anchor: record.anchor.clone(),
        });
    }

    let patched = content.replace(&record.anchor, &record.replacement);
    std::fs::write(&file, patched).map_err(io_err)?;
    tracing::debug!(file = %record.file.display(), anchor = %record.anchor, "patched");
    Ok(())
}

/// Apply `records` in order, stopping at the first failure.
///
/// # Errors
///
/// Propagates the first [`PatchError`].
pub fn apply_all(root: &Path, records: &[PatchRecord]) -> Result<usize, PatchError> {
    for record in records {
        apply(root, record)?;
    }
    Ok(records.len())
}
