use anyhow::{Context, Result, bail};
use std::path::Path;

use doxy_core::Reporter;
use doxy_core::package::read_package_info;
use doxy_core::selftest::{self, SelfTest};
use doxy_schema::Platform;

use crate::ui::ConsoleReporter;

/// Run the self-test against an already packaged output.
pub fn test(package: &Path, reporter: &ConsoleReporter) -> Result<()> {
    let info = read_package_info(package)
        .with_context(|| format!("{} is not a doxy package", package.display()))?;
    let platform = Platform::new(info.os, info.build_arch)
        .with_target_arch(info.target_arch)
        .with_compiler(info.compiler);

    report(&selftest::run(&platform, package)?, reporter)
}

pub(crate) fn report(result: &SelfTest, reporter: &impl Reporter) -> Result<()> {
    match result {
        SelfTest::Passed(version) if version.is_empty() => {
            bail!("doxygen --version printed nothing")
        }
        SelfTest::Passed(version) => {
            reporter.success(&format!("doxygen {version} runs"));
        }
        SelfTest::Skipped => reporter.info("Cross-building: self-test skipped"),
    }
    Ok(())
}
