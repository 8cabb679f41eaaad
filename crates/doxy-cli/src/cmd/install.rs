use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use doxy_core::env::Shell;
use doxy_core::{Recipe, Reporter, selftest};

use crate::PlatformArgs;
use crate::config;
use crate::ui::ConsoleReporter;

/// Options for `doxy install` beyond platform selection.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub output: Option<PathBuf>,
    pub workdir: Option<PathBuf>,
    pub insecure: bool,
    pub verbose: bool,
    pub skip_test: bool,
}

/// Run the recipe and report where the package landed.
pub async fn install(
    config_path: Option<&Path>,
    args: &PlatformArgs,
    opts: &InstallOptions,
    reporter: &ConsoleReporter,
) -> Result<()> {
    let mut config = config::load(config_path, args)?;
    if opts.insecure {
        config.verify_tls = false;
    }
    let platform = config::platform(args);
    let start = Instant::now();

    reporter.section(&format!("doxygen {} for {platform}", config.version));

    let mut recipe = Recipe::new(&config, platform, reporter).verbose(opts.verbose);
    if let Some(output) = &opts.output {
        recipe = recipe.with_output(output);
    }
    if let Some(workdir) = &opts.workdir {
        recipe = recipe.with_workdir(workdir);
    }
    tracing::debug!(?recipe, "starting recipe");

    let outcome = match recipe.run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            reporter.error(&e.to_string());
            return Err(e).context(format!("Installing doxygen {} failed", config.version));
        }
    };

    if opts.skip_test {
        reporter.info("Self-test skipped");
    } else {
        reporter.section("Testing");
        let result = selftest::run(&platform, &outcome.package_root)?;
        super::test::report(&result, reporter)?;
    }

    reporter.success(&format!(
        "Packaged {} files into {} in {:.1}s",
        outcome.artifacts.len(),
        outcome.package_root.display(),
        start.elapsed().as_secs_f64()
    ));
    reporter.info(&outcome.env.render(Shell::Sh));
    Ok(())
}
