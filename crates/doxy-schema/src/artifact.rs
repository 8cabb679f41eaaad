//! Recognized output files and the package description written next to them.

use serde::{Deserialize, Serialize};

use crate::platform::{Arch, Compiler, Os};

/// Name of the primary executable (without OS suffix).
pub const PRIMARY_PROGRAM: &str = "doxygen";

/// File-name patterns copied into `bin/`, in copy order.
///
/// Not every pattern matches on every platform (`*.dll` on Linux, for
/// example); unmatched patterns are skipped.
pub const ARTIFACT_PATTERNS: &[&str] = &[
    "doxygen",
    "doxyindexer",
    "doxysearch.cgi",
    "*.exe",
    "*.dylib",
    "*.dll",
];

/// File names that ended up in `bin/`, sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactSet(Vec<String>);

impl ArtifactSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file name; duplicates are ignored.
    pub fn insert(&mut self, name: impl Into<String>) {
        let name = name.into();
        if let Err(pos) = self.0.binary_search(&name) {
            self.0.insert(pos, name);
        }
    }

    /// Whether `name` was packaged.
    pub fn contains(&self, name: &str) -> bool {
        self.0.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    /// Number of packaged files.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing was packaged.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Contents of `doxy-package.json` in a package root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Always `doxygen`
    pub name: String,
    /// doxygen version
    pub version: String,
    /// Identity derived from the settings that affect the binaries
    pub package_id: String,
    /// Operating system
    pub os: Os,
    /// Build machine architecture
    pub build_arch: Arch,
    /// Consumer architecture
    pub target_arch: Arch,
    /// Compiler setting at packaging time
    pub compiler: Compiler,
    /// Whether the binaries were compiled locally
    pub build_from_source: bool,
    /// Files in `bin/`
    pub files: ArtifactSet,
}

/// Name of the package description file.
pub const PACKAGE_INFO_FILE: &str = "doxy-package.json";
