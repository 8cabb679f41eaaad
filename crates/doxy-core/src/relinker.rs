//! Mach-O load command patching.
//!
//! Inside `Doxygen.app` the executable finds libclang at
//! `@executable_path/../Frameworks/libclang.dylib`. Once both files are
//! copied side by side into `bin/` that path no longer resolves, so the
//! load command is rewritten to `@executable_path/libclang.dylib`.

use std::path::Path;
use std::process::Command;

use crate::error::RecipeError;

/// libclang reference as shipped inside the app bundle.
pub const BUNDLED_LIBCLANG: &str = "@executable_path/../Frameworks/libclang.dylib";

/// libclang reference once it sits next to the executable.
pub const ADJACENT_LIBCLANG: &str = "@executable_path/libclang.dylib";

/// Utilities for patching Mach-O headers.
#[derive(Debug)]
pub struct Relinker;

impl Relinker {
    /// Point `binary` at a libclang beside it.
    ///
    /// Files that are not Mach-O are left alone and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if `install_name_tool` is missing or fails.
    pub fn redirect_libclang(binary: &Path) -> Result<bool, RecipeError> {
        if !Self::is_macho(binary) {
            tracing::warn!(path = %binary.display(), "not a Mach-O file, skipping relink");
            return Ok(false);
        }
        Self::change_dep(binary, BUNDLED_LIBCLANG, ADJACENT_LIBCLANG)?;
        Ok(true)
    }

    /// Updates a load command to point to a new location.
    ///
    /// # Errors
    ///
    /// Returns an error if `install_name_tool` is not found, exits with a
    /// non-zero status, or the subsequent code-signing step fails.
    pub fn change_dep(path: &Path, old: &str, new: &str) -> Result<(), RecipeError> {
        Self::run_install_name_tool(path, &["-change", old, new])?;
        Self::resign(path);
        Ok(())
    }

    /// Executes `install_name_tool` and handles errors.
    fn run_install_name_tool(path: &Path, args: &[&str]) -> Result<(), RecipeError> {
        let output = match Command::new("install_name_tool")
            .args(args)
            .arg(path)
            .output()
        {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecipeError::Relink(
                    "'install_name_tool' not found. Please install Xcode Command Line Tools: xcode-select --install"
                        .to_string(),
                ));
            }
            Err(e) => {
                return Err(RecipeError::Relink(format!(
                    "Failed to spawn install_name_tool: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecipeError::Relink(format!(
                "install_name_tool failed on {}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        Ok(())
    }

    /// Re-applies ad-hoc code signing after a header change invalidated
    /// the original signature. Failure is logged, not fatal.
    pub fn resign(path: &Path) {
        let result = Command::new("codesign")
            .args(["-s", "-", "--force"])
            .arg(path)
            .output();

        match result {
            Ok(o) if o.status.success() => {}
            Ok(o) => tracing::warn!(
                path = %path.display(),
                "codesign failed: {}",
                String::from_utf8_lossy(&o.stderr).trim()
            ),
            Err(e) => tracing::warn!(path = %path.display(), "codesign unavailable: {e}"),
        }
    }

    /// Checks if a file is a Mach-O binary (magic bytes).
    pub fn is_macho(path: &Path) -> bool {
        use std::io::Read;
        let Ok(mut f) = std::fs::File::open(path) else {
            return false;
        };
        let mut magic = [0u8; 4];
        if f.read_exact(&mut magic).is_err() {
            return false;
        }
        // feedface, feedfacf, cafebabe (universal) - and their LE/BE variants
        matches!(
            magic,
            [0xfe, 0xed, 0xfa, 0xce]
                | [0xfe, 0xed, 0xfa, 0xcf]
                | [0xcf, 0xfa, 0xed, 0xfe]
                | [0xce, 0xfa, 0xed, 0xfe]
                | [0xca, 0xfe, 0xba, 0xbe]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_macho_detects_magic() {
        let dir = tempfile::tempdir().unwrap();
        let macho = dir.path().join("doxygen");
        std::fs::write(&macho, [0xcf, 0xfa, 0xed, 0xfe, 0, 0]).unwrap();
        let script = dir.path().join("doxysearch.cgi");
        std::fs::write(&script, b"#!/bin/sh\n").unwrap();

        assert!(Relinker::is_macho(&macho));
        assert!(!Relinker::is_macho(&script));
        assert!(!Relinker::is_macho(&dir.path().join("missing")));
    }

    #[test]
    fn test_non_macho_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doxygen");
        std::fs::write(&path, b"ELF").unwrap();
        assert!(!Relinker::redirect_libclang(&path).unwrap());
    }
}
