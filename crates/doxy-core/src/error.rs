//! Pipeline errors.
//!
//! Every failure is fatal; nothing here is retried. [`RecipeError::kind`]
//! groups the variants by the stage that raises them.

use std::path::PathBuf;

use thiserror::Error;

use crate::io::download::DownloadError;
use crate::io::extract::ExtractError;
use crate::patch::PatchError;

/// Broad class of a [`RecipeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any network or build work
    Configuration,
    /// Download, checksum, toolchain or build failure
    Provisioning,
    /// Expected output missing after build or extraction
    Packaging,
}

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Unsupported configuration: {0}")]
    UnsupportedPlatform(String),

    #[error("Invalid version '{0}': expected major.minor.patch")]
    InvalidVersion(String),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Patching failed: {0}")]
    Patch(#[from] PatchError),

    #[error("Required build tool '{0}' not found on PATH")]
    MissingTool(String),

    #[error("Build step '{step}' failed: {message}")]
    Build { step: &'static str, message: String },

    #[error("Disk image error: {0}")]
    DiskImage(String),

    #[error("Relinking failed: {0}")]
    Relink(String),

    #[error("Primary executable '{name}' not found in {}", dir.display())]
    MissingExecutable { name: String, dir: PathBuf },

    #[error("Self-test failed: {0}")]
    SelfTest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecipeError {
    /// Which stage class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedPlatform(_) | Self::InvalidVersion(_) => ErrorKind::Configuration,
            Self::MissingExecutable { .. } | Self::SelfTest(_) => ErrorKind::Packaging,
            _ => ErrorKind::Provisioning,
        }
    }

    /// Create a build error for the named step.
    pub fn build(step: &'static str, msg: impl std::fmt::Display) -> Self {
        Self::Build {
            step,
            message: msg.to_string(),
        }
    }
}
