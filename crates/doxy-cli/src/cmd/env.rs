use anyhow::{Result, bail};
use std::path::Path;

use doxy_core::env::{EnvContribution, Shell};

/// Print the line that appends `<package>/bin` to `PATH`.
pub fn env(package: &Path, shell: Shell) -> Result<()> {
    if !package.join("bin").is_dir() {
        bail!("{} has no bin/ directory", package.display());
    }
    let package = std::path::absolute(package)?;
    println!("{}", EnvContribution::for_package(&package).render(shell));
    Ok(())
}
