//! Stable identity of a package configuration.
//!
//! Only settings that change the produced binaries take part. The target
//! architecture and compiler do not: the packaged tool runs on the build
//! machine. On Windows the 64-bit archive serves both architectures, so the
//! build architecture is left out there as well.

use sha2::{Digest, Sha256};

use doxy_schema::{Os, Platform};

const ID_LEN: usize = 16;

/// First 16 hex chars of SHA-256 over the identifying settings.
pub fn package_id(platform: &Platform, version: &str, build_from_source: bool) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("version={version}\n"));
    hasher.update(format!("os={}\n", platform.os));
    if platform.os != Os::Windows {
        hasher.update(format!("arch_build={}\n", platform.build_arch));
    }
    hasher.update(format!("build_from_source={build_from_source}\n"));

    let mut id = hex::encode(hasher.finalize());
    id.truncate(ID_LEN);
    id
}
