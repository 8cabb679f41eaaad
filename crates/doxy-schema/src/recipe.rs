//! Recipe configuration.
//!
//! [`RecipeConfig`] is fixed for a release of the recipe: it pins the doxygen
//! version, the checksum of its source archive, and where archives are
//! fetched from. An optional `doxy.toml` ([`RecipeFile`]) overrides any of
//! these and appends extra [`PatchRecord`]s.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::hash::Sha256Digest;

/// doxygen release pinned by this recipe.
pub const DEFAULT_VERSION: &str = "1.8.16";

/// SHA256 of `Release_1_8_16.zip` from the upstream GitHub archive.
pub const DEFAULT_SOURCE_SHA256: &str =
    "336d367ca081dd6117ddaa7503314b4a0241e548b0571d6b413fb0b826468089";

/// Base URL for upstream source archives (`<base>/Release_x_y_z.zip`).
pub const DEFAULT_SOURCE_BASE_URL: &str = "https://github.com/doxygen/doxygen/archive";

/// Base URL for prebuilt archives (`<base>/rel-x.y.z/<file>`).
pub const DEFAULT_BINARY_BASE_URL: &str = "https://downloads.sourceforge.net/project/doxygen";

/// One textual substitution applied to an extracted source tree.
///
/// `file` is relative to the source root. The anchor must be present or
/// the patch fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRecord {
    /// File to patch, relative to the source root
    pub file: PathBuf,
    /// Exact text that must be present
    pub anchor: String,
    /// Text that replaces every occurrence of the anchor
    pub replacement: String,
}

impl PatchRecord {
    /// Convenience constructor.
    pub fn new(
        file: impl Into<PathBuf>,
        anchor: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            anchor: anchor.into(),
            replacement: replacement.into(),
        }
    }
}

/// Immutable configuration threaded through every pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeConfig {
    /// doxygen version (`major.minor.patch`)
    pub version: String,
    /// Expected digest of the source archive
    pub source_sha256: Sha256Digest,
    /// Expected digest of the prebuilt archive, when pinned
    pub binary_sha256: Option<Sha256Digest>,
    /// Compile from source instead of fetching a prebuilt archive
    pub build_from_source: bool,
    /// Verify TLS certificates on downloads
    pub verify_tls: bool,
    /// Base URL for source archives
    pub source_base_url: String,
    /// Base URL for prebuilt archives
    pub binary_base_url: String,
    /// Patches applied after the built-in set
    pub extra_patches: Vec<PatchRecord>,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            source_sha256: Sha256Digest::trusted(DEFAULT_SOURCE_SHA256),
            binary_sha256: None,
            build_from_source: false,
            verify_tls: true,
            source_base_url: DEFAULT_SOURCE_BASE_URL.to_string(),
            binary_base_url: DEFAULT_BINARY_BASE_URL.to_string(),
            extra_patches: Vec::new(),
        }
    }
}

impl RecipeConfig {
    /// Layer the values present in `file` over `self`.
    pub fn merge(mut self, file: RecipeFile) -> Self {
        if let Some(version) = file.version {
            self.version = version;
        }
        if let Some(sha) = file.source_sha256 {
            self.source_sha256 = sha;
        }
        if file.binary_sha256.is_some() {
            self.binary_sha256 = file.binary_sha256;
        }
        if let Some(flag) = file.build_from_source {
            self.build_from_source = flag;
        }
        if let Some(flag) = file.verify_tls {
            self.verify_tls = flag;
        }
        if let Some(url) = file.source_base_url {
            self.source_base_url = url;
        }
        if let Some(url) = file.binary_base_url {
            self.binary_base_url = url;
        }
        self.extra_patches.extend(file.patches);
        self
    }
}

/// On-disk form of a recipe override (`doxy.toml`).
///
/// ```toml
/// version = "1.8.16"
/// source_sha256 = "336d367ca081dd6117ddaa7503314b4a0241e548b0571d6b413fb0b826468089"
///
/// [[patch]]
/// file = "src/CMakeLists.txt"
/// anchor = "set(CMAKE_CXX_STANDARD 11)"
/// replacement = "set(CMAKE_CXX_STANDARD 14)"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeFile {
    /// Version override
    pub version: Option<String>,
    /// Source digest override
    pub source_sha256: Option<Sha256Digest>,
    /// Pinned prebuilt digest
    pub binary_sha256: Option<Sha256Digest>,
    /// Build mode override
    pub build_from_source: Option<bool>,
    /// TLS verification override
    pub verify_tls: Option<bool>,
    /// Source mirror
    pub source_base_url: Option<String>,
    /// Prebuilt mirror
    pub binary_base_url: Option<String>,
    /// Extra patches, in order
    #[serde(default, rename = "patch")]
    pub patches: Vec<PatchRecord>,
}
