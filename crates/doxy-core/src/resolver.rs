//! Platform validation and archive-name resolution.
//!
//! Everything here is a pure function of the platform and the recipe
//! configuration: no IO, no environment lookups.

use doxy_schema::{Arch, Os, Platform, RecipeConfig};

use crate::error::RecipeError;
use crate::io::extract::ArchiveFormat;

/// The four prebuilt archive flavours published upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrebuiltArchive {
    /// 32-bit Windows zip
    WindowsX86,
    /// 64-bit Windows zip (also served to ARM Windows)
    WindowsX64,
    /// macOS disk image
    Macos,
    /// Linux tarball (also served to other Unix-likes)
    Linux,
}

/// `(os, arch, archive)` rows, first match wins. `None` matches anything.
const ARCHIVE_TABLE: &[(Option<Os>, Option<Arch>, PrebuiltArchive)] = &[
    (Some(Os::Windows), Some(Arch::X86), PrebuiltArchive::WindowsX86),
    (Some(Os::Windows), None, PrebuiltArchive::WindowsX64),
    (Some(Os::Macos), None, PrebuiltArchive::Macos),
    (None, None, PrebuiltArchive::Linux),
];

impl PrebuiltArchive {
    /// Look up the archive flavour for a build machine.
    pub fn for_platform(os: Os, arch: Arch) -> Self {
        ARCHIVE_TABLE
            .iter()
            .find(|(o, a, _)| o.is_none_or(|o| o == os) && a.is_none_or(|a| a == arch))
            .map_or(Self::Linux, |(_, _, archive)| *archive)
    }

    fn program(self) -> &'static str {
        match self {
            Self::Macos => "Doxygen",
            _ => "doxygen",
        }
    }

    fn ending(self) -> &'static str {
        match self {
            Self::WindowsX86 => "windows.bin.zip",
            Self::WindowsX64 => "windows.x64.bin.zip",
            Self::Macos => "dmg",
            Self::Linux => "linux.bin.tar.gz",
        }
    }

    /// Upstream file name, e.g. `doxygen-1.8.16.linux.bin.tar.gz`.
    pub fn file_name(self, version: &str) -> String {
        format!("{}-{version}.{}", self.program(), self.ending())
    }

    /// How the downloaded file is unpacked.
    pub fn format(self) -> ArchiveFormat {
        match self {
            Self::WindowsX86 | Self::WindowsX64 => ArchiveFormat::Zip,
            Self::Macos => ArchiveFormat::Dmg,
            Self::Linux => ArchiveFormat::TarGz,
        }
    }

    /// Local name the archive is saved under inside the work directory.
    pub fn download_name(self) -> &'static str {
        match self.format() {
            ArchiveFormat::Zip => "file.zip",
            ArchiveFormat::Dmg => "file.dmg",
            ArchiveFormat::TarGz => "file.tar.gz",
        }
    }
}

/// Reject platform combinations upstream does not ship binaries for.
///
/// # Errors
///
/// Returns [`RecipeError::UnsupportedPlatform`] for x86 on Linux or macOS.
pub fn validate(platform: &Platform) -> Result<(), RecipeError> {
    if matches!(platform.os, Os::Linux | Os::Macos) && platform.build_arch == Arch::X86 {
        return Err(RecipeError::UnsupportedPlatform(
            "x86 is not supported on Linux or Macos".to_string(),
        ));
    }
    Ok(())
}

/// Check that `version` is `major.minor.patch` with numeric components.
///
/// # Errors
///
/// Returns [`RecipeError::InvalidVersion`] otherwise.
pub fn validate_version(version: &str) -> Result<(), RecipeError> {
    let parts: Vec<&str> = version.split('.').collect();
    let numeric = |p: &&str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    if parts.len() == 3 && parts.iter().all(numeric) {
        Ok(())
    } else {
        Err(RecipeError::InvalidVersion(version.to_string()))
    }
}

/// Validate the platform and return the prebuilt file name for it.
///
/// # Errors
///
/// Returns [`RecipeError::UnsupportedPlatform`] when [`validate`] rejects it.
pub fn archive_file_name(platform: &Platform, version: &str) -> Result<String, RecipeError> {
    validate(platform)?;
    Ok(PrebuiltArchive::for_platform(platform.os, platform.build_arch).file_name(version))
}

/// Upstream release tag: `1.8.16` becomes `Release_1_8_16`.
pub fn release_tag(version: &str) -> String {
    format!("Release_{}", version.replace('.', "_"))
}

/// Top-level directory inside the source archive.
pub fn source_dir_name(version: &str) -> String {
    format!("doxygen-{}", release_tag(version))
}

/// URL of the versioned source zip.
pub fn source_url(base: &str, version: &str) -> String {
    format!("{}/{}.zip", base.trim_end_matches('/'), release_tag(version))
}

/// URL of a prebuilt archive.
pub fn binary_url(base: &str, version: &str, file_name: &str) -> String {
    format!("{}/rel-{version}/{file_name}", base.trim_end_matches('/'))
}

/// Everything the pipeline needs to know about where doxygen comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Prebuilt flavour for this platform
    pub archive: PrebuiltArchive,
    /// Prebuilt file name
    pub file_name: String,
    /// Prebuilt download URL
    pub binary_url: String,
    /// Source archive URL
    pub source_url: String,
}

/// Validate inputs and resolve all download locations.
///
/// # Errors
///
/// Returns a configuration error for unsupported platforms or malformed
/// versions.
pub fn resolve(platform: &Platform, config: &RecipeConfig) -> Result<Resolution, RecipeError> {
    validate(platform)?;
    validate_version(&config.version)?;

    let archive = PrebuiltArchive::for_platform(platform.os, platform.build_arch);
    let file_name = archive.file_name(&config.version);
    Ok(Resolution {
        archive,
        binary_url: binary_url(&config.binary_base_url, &config.version, &file_name),
        source_url: source_url(&config.source_base_url, &config.version),
        file_name,
    })
}
