//! Packaging step: copy recognized artifacts into `<output>/bin`.
//!
//! Copying is driven by [`CopyRule`]s (a directory plus a file-name
//! pattern). Patterns that match nothing are skipped; only the primary
//! executable is required. Re-running over the same staging tree overwrites
//! the same files, so the result is identical.

use std::path::{Path, PathBuf};

use doxy_schema::{
    ARTIFACT_PATTERNS, ArtifactSet, PACKAGE_INFO_FILE, PRIMARY_PROGRAM, PackageInfo, Platform,
};

use crate::builder::INSTALL_SUBFOLDER;
use crate::error::RecipeError;
use crate::resolver::PrebuiltArchive;

/// Copy every file in `dir` whose name matches `pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRule {
    pub dir: PathBuf,
    pub pattern: String,
}

impl CopyRule {
    pub fn new(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    /// Regular files matched by this rule, in glob order.
    fn matches(&self) -> Result<Vec<PathBuf>, RecipeError> {
        let dir = glob::Pattern::escape(&self.dir.to_string_lossy());
        let full = format!("{dir}/{}", self.pattern);
        let paths = glob::glob(&full).map_err(|e| {
            RecipeError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("bad pattern {full}: {e}"),
            ))
        })?;

        let mut files = Vec::new();
        for entry in paths {
            let path = entry.map_err(glob::GlobError::into_error)?;
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }
}

/// Where artifacts are picked up from for a given build mode.
///
/// - prebuilt Linux archives keep everything under `doxygen-<version>/bin`
/// - prebuilt archives and disk images leave files in the work directory
/// - source builds install into `<workdir>/install/bin`
pub fn copy_rules(
    platform: &Platform,
    version: &str,
    workdir: &Path,
    build_from_source: bool,
) -> Vec<CopyRule> {
    let mut rules = Vec::new();
    let staging = if build_from_source {
        workdir.join(INSTALL_SUBFOLDER).join("bin")
    } else {
        // The tarball nests its programs under doxygen-<version>/bin
        if PrebuiltArchive::for_platform(platform.os, platform.build_arch) == PrebuiltArchive::Linux
        {
            rules.push(CopyRule::new(
                workdir.join(format!("doxygen-{version}")).join("bin"),
                "*",
            ));
        }
        workdir.to_path_buf()
    };

    rules.extend(
        ARTIFACT_PATTERNS
            .iter()
            .map(|pattern| CopyRule::new(&staging, *pattern)),
    );
    rules
}

/// Copy everything `rules` match into `<output>/bin`.
///
/// # Errors
///
/// Returns [`RecipeError::MissingExecutable`] when `doxygen` (or
/// `doxygen.exe`) is absent afterwards, or an IO error if a copy fails.
pub fn package(
    rules: &[CopyRule],
    platform: &Platform,
    output: &Path,
) -> Result<ArtifactSet, RecipeError> {
    let bin = output.join("bin");
    std::fs::create_dir_all(&bin)?;

    let mut artifacts = ArtifactSet::new();
    for rule in rules {
        for src in rule.matches()? {
            let Some(name) = src.file_name() else {
                continue;
            };
            let dest = bin.join(name);
            std::fs::copy(&src, &dest)?;
            tracing::debug!(src = %src.display(), dest = %dest.display(), "packaged");
            artifacts.insert(name.to_string_lossy());
        }
    }

    let primary = platform.executable_name(PRIMARY_PROGRAM);
    if !bin.join(&primary).is_file() {
        return Err(RecipeError::MissingExecutable {
            name: primary,
            dir: bin,
        });
    }

    Ok(artifacts)
}

/// Write `doxy-package.json` into the package root.
pub fn write_package_info(output: &Path, info: &PackageInfo) -> Result<PathBuf, RecipeError> {
    let path = output.join(PACKAGE_INFO_FILE);
    let json = serde_json::to_string_pretty(info).map_err(std::io::Error::other)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

/// Read `doxy-package.json` from a package root.
pub fn read_package_info(output: &Path) -> Result<PackageInfo, RecipeError> {
    let content = std::fs::read_to_string(output.join(PACKAGE_INFO_FILE))?;
    serde_json::from_str(&content).map_err(|e| RecipeError::Io(std::io::Error::other(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doxy_schema::{Arch, Os};
    use std::collections::BTreeMap;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, path.file_name().unwrap().to_string_lossy().as_bytes()).unwrap();
    }

    fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .map(|p| {
                (
                    p.file_name().unwrap().to_string_lossy().to_string(),
                    std::fs::read(&p).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_linux_prebuilt_copies_bin_dir() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        touch(&work.path().join("doxygen-1.8.20/bin/doxygen"));
        touch(&work.path().join("doxygen-1.8.20/bin/doxyindexer"));
        touch(&work.path().join("doxygen-1.8.20/bin/doxysearch.cgi"));
        touch(&work.path().join("doxygen-1.8.20/html/index.html"));

        let platform = Platform::new(Os::Linux, Arch::X86_64);
        let rules = copy_rules(&platform, "1.8.20", work.path(), false);
        let set = package(&rules, &platform, out.path()).unwrap();

        let names: Vec<&str> = set.iter().collect();
        assert_eq!(names, ["doxygen", "doxyindexer", "doxysearch.cgi"]);
        assert!(!out.path().join("bin/index.html").exists());
    }

    #[test]
    fn test_freebsd_prebuilt_uses_tarball_layout() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        touch(&work.path().join("doxygen-1.8.20/bin/doxygen"));

        let platform = Platform::new(Os::FreeBsd, Arch::X86_64);
        let rules = copy_rules(&platform, "1.8.20", work.path(), false);
        let set = package(&rules, &platform, out.path()).unwrap();

        assert!(set.contains("doxygen"));
    }

    #[test]
    fn test_windows_prebuilt_picks_exe_and_dll() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        touch(&work.path().join("doxygen.exe"));
        touch(&work.path().join("doxyindexer.exe"));
        touch(&work.path().join("libclang.dll"));
        touch(&work.path().join("file.zip"));

        let platform = Platform::new(Os::Windows, Arch::X86_64);
        let rules = copy_rules(&platform, "1.8.20", work.path(), false);
        let set = package(&rules, &platform, out.path()).unwrap();

        assert!(set.contains("doxygen.exe"));
        assert!(set.contains("libclang.dll"));
        assert!(!set.contains("file.zip"));
    }

    #[test]
    fn test_source_build_uses_install_prefix() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        touch(&work.path().join("install/bin/doxygen"));

        let platform = Platform::new(Os::Linux, Arch::X86_64);
        let rules = copy_rules(&platform, "1.8.20", work.path(), true);
        assert!(rules.iter().all(|r| r.dir == work.path().join("install/bin")));

        let set = package(&rules, &platform, out.path()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_missing_primary_executable_is_fatal() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        touch(&work.path().join("doxyindexer"));

        let platform = Platform::new(Os::Macos, Arch::Armv8);
        let rules = copy_rules(&platform, "1.8.20", work.path(), false);
        let err = package(&rules, &platform, out.path()).unwrap_err();

        assert!(matches!(err, RecipeError::MissingExecutable { ref name, .. } if name == "doxygen"));
        assert_eq!(err.kind(), crate::ErrorKind::Packaging);
    }

    #[test]
    fn test_packaging_is_idempotent() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        touch(&work.path().join("doxygen"));
        touch(&work.path().join("doxyindexer"));
        touch(&work.path().join("libclang.dylib"));

        let platform = Platform::new(Os::Macos, Arch::X86_64);
        let rules = copy_rules(&platform, "1.8.20", work.path(), false);

        let first = package(&rules, &platform, out.path()).unwrap();
        let before = snapshot(&out.path().join("bin"));
        let second = package(&rules, &platform, out.path()).unwrap();
        let after = snapshot(&out.path().join("bin"));

        assert_eq!(first, second);
        assert_eq!(before, after);
    }

    #[test]
    fn test_package_info_round_trip() {
        let out = tempfile::tempdir().unwrap();
        let mut files = ArtifactSet::new();
        files.insert("doxygen");
        let info = PackageInfo {
            name: "doxygen".to_string(),
            version: "1.8.16".to_string(),
            package_id: "abc".to_string(),
            os: Os::Linux,
            build_arch: Arch::X86_64,
            target_arch: Arch::X86_64,
            compiler: doxy_schema::Compiler::Gcc,
            build_from_source: false,
            files,
        };

        write_package_info(out.path(), &info).unwrap();
        assert_eq!(read_package_info(out.path()).unwrap(), info);
    }
}
