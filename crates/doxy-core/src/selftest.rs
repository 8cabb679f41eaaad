//! Post-package smoke test: `doxygen --version`.

use std::path::Path;
use std::process::Command;

use doxy_schema::{PRIMARY_PROGRAM, Platform};

use crate::env::EnvContribution;
use crate::error::RecipeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelfTest {
    /// Exit status zero, with the version doxygen reported
    Passed(String),
    /// Binaries target another machine and cannot run here
    Skipped,
}

/// Run the packaged `doxygen --version` with the package's `PATH`
/// contribution applied to the child process.
///
/// # Errors
///
/// [`RecipeError::SelfTest`] if the program cannot be spawned or exits
/// non-zero.
pub fn run(platform: &Platform, package_root: &Path) -> Result<SelfTest, RecipeError> {
    if platform.is_cross_building() {
        tracing::info!(%platform, "cross-building, self-test skipped");
        return Ok(SelfTest::Skipped);
    }

    let env = EnvContribution::for_package(package_root);
    let path = env
        .apply_to_current()
        .map_err(|e| RecipeError::SelfTest(e.to_string()))?;
    let program = package_root
        .join("bin")
        .join(platform.executable_name(PRIMARY_PROGRAM));

    let output = Command::new(&program)
        .arg("--version")
        .env(env.var, path)
        .output()
        .map_err(|e| RecipeError::SelfTest(format!("cannot run {}: {e}", program.display())))?;

    if !output.status.success() {
        return Err(RecipeError::SelfTest(format!(
            "{} --version exited with {}: {}",
            program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    tracing::debug!(%version, "self-test passed");
    Ok(SelfTest::Passed(version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doxy_schema::{Arch, Os};

    #[test]
    fn test_cross_building_is_skipped() {
        let host = Platform::host();
        let other = match host.build_arch {
            Arch::Armv8 => Arch::X86_64,
            _ => Arch::Armv8,
        };
        let platform = host.with_target_arch(other);
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(run(&platform, dir.path()).unwrap(), SelfTest::Skipped);
    }

    #[test]
    fn test_foreign_os_is_skipped() {
        let os = if Os::current() == Os::Windows {
            Os::Linux
        } else {
            Os::Windows
        };
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            run(&Platform::new(os, Arch::X86_64), dir.path()).unwrap(),
            SelfTest::Skipped
        );
    }

    #[test]
    fn test_missing_binary_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&Platform::host(), dir.path()).unwrap_err();
        assert!(matches!(err, RecipeError::SelfTest(_)));
        assert_eq!(err.kind(), crate::ErrorKind::Packaging);
    }

    #[cfg(unix)]
    fn fake_doxygen(root: &Path, script: &str) {
        use std::os::unix::fs::PermissionsExt;
        let bin = root.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let path = bin.join("doxygen");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_reports_version() {
        let dir = tempfile::tempdir().unwrap();
        fake_doxygen(dir.path(), "#!/bin/sh\necho 1.8.16\n");
        assert_eq!(
            run(&Platform::host(), dir.path()).unwrap(),
            SelfTest::Passed("1.8.16".to_string())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_fails() {
        let dir = tempfile::tempdir().unwrap();
        fake_doxygen(dir.path(), "#!/bin/sh\necho broken >&2\nexit 3\n");
        let err = run(&Platform::host(), dir.path()).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
