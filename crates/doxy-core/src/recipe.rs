//! The recipe pipeline.
//!
//! One linear pass: validate, (discover toolchain), fetch, build or unpack,
//! package, write the environment contribution. Every stage reads the same
//! immutable [`RecipeConfig`]; nothing is retried.

use std::path::{Path, PathBuf};

use reqwest::Client;

use doxy_schema::{ArtifactSet, PACKAGE_NAME, PackageInfo, Platform, RecipeConfig};

use crate::builder::{BUILD_SUBFOLDER, Builder, INSTALL_SUBFOLDER, Toolchain};
use crate::env::EnvContribution;
use crate::error::RecipeError;
use crate::io::dmg::{self, Hdiutil, VolumeMounter};
use crate::io::download::{DownloadRequest, build_client};
use crate::io::extract::{self, ArchiveFormat};
use crate::package;
use crate::package_id::package_id;
use crate::patch::TOOLCHAIN_INCLUDE;
use crate::relinker::Relinker;
use crate::reporter::Reporter;
use crate::resolver::{self, Resolution};
use crate::source;

/// A configured pipeline run.
pub struct Recipe<'a> {
    config: &'a RecipeConfig,
    platform: Platform,
    reporter: &'a dyn Reporter,
    mounter: &'a (dyn VolumeMounter + Sync),
    package_id: String,
    workdir: PathBuf,
    output: PathBuf,
    log_path: PathBuf,
    verbose: bool,
}

impl std::fmt::Debug for Recipe<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recipe")
            .field("version", &self.config.version)
            .field("platform", &self.platform)
            .field("package_id", &self.package_id)
            .field("workdir", &self.workdir)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub package_root: PathBuf,
    pub bin_dir: PathBuf,
    pub artifacts: ArtifactSet,
    pub env: EnvContribution,
    pub package_id: String,
}

impl<'a> Recipe<'a> {
    /// A run writing to the default locations under the doxy home.
    pub fn new(config: &'a RecipeConfig, platform: Platform, reporter: &'a dyn Reporter) -> Self {
        let id = package_id(&platform, &config.version, config.build_from_source);
        Self {
            config,
            platform,
            reporter,
            mounter: &Hdiutil,
            workdir: crate::paths::work_dir(&config.version, &id),
            output: crate::paths::package_dir(&config.version, &id),
            log_path: crate::paths::build_log_path(&config.version),
            package_id: id,
            verbose: false,
        }
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Replace `hdiutil` for disk image handling.
    pub fn with_mounter(mut self, mounter: &'a (dyn VolumeMounter + Sync)) -> Self {
        self.mounter = mounter;
        self
    }

    /// Stream build tool output instead of writing it to the build log.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Run every stage in order.
    ///
    /// # Errors
    ///
    /// The first failing stage aborts the run. Configuration errors are
    /// raised before any network access.
    pub async fn run(&self) -> Result<Outcome, RecipeError> {
        let resolution = resolver::resolve(&self.platform, self.config)?;
        tracing::info!(
            platform = %self.platform,
            version = %self.config.version,
            package_id = %self.package_id,
            "resolved {}",
            resolution.file_name
        );

        let toolchain = if self.config.build_from_source {
            Some(Toolchain::discover()?)
        } else {
            None
        };

        std::fs::create_dir_all(&self.workdir)?;
        if !self.config.verify_tls {
            self.reporter
                .warning("TLS certificate verification is disabled for downloads");
        }
        let client = build_client(self.config.verify_tls)?;

        match toolchain {
            Some(toolchain) => self.build_from_source(toolchain, &client).await?,
            None => self.fetch_prebuilt(&resolution, &client).await?,
        }

        self.reporter.section("Packaging");
        let rules = package::copy_rules(
            &self.platform,
            &self.config.version,
            &self.workdir,
            self.config.build_from_source,
        );
        let artifacts = package::package(&rules, &self.platform, &self.output)?;
        package::write_package_info(&self.output, &self.package_info(&artifacts))?;
        self.reporter.done(
            "bin",
            &format!("{} files in {}", artifacts.len(), self.output.join("bin").display()),
        );

        let env = EnvContribution::for_package(&self.output);
        env.write_scripts(&self.output)?;

        Ok(Outcome {
            package_root: self.output.clone(),
            bin_dir: self.output.join("bin"),
            artifacts,
            env,
            package_id: self.package_id.clone(),
        })
    }

    async fn fetch_prebuilt(
        &self,
        resolution: &Resolution,
        client: &Client,
    ) -> Result<(), RecipeError> {
        self.reporter.section("Fetching");
        let archive = self.workdir.join(resolution.archive.download_name());

        DownloadRequest::new(client, &resolution.binary_url, &archive, self.reporter)
            .with_optional_hash(self.config.binary_sha256.as_ref())
            .with_label(&resolution.file_name)
            .execute()
            .await?;

        self.reporter.extracting(&resolution.file_name);
        let unpacked = match resolution.archive.format() {
            ArchiveFormat::Dmg => dmg::unpack_dmg(self.mounter, &archive, &self.workdir).map(|_| ()),
            format => extract::extract(&archive, format, &self.workdir).map_err(RecipeError::from),
        };
        std::fs::remove_file(&archive).ok();
        unpacked?;

        if resolution.archive.format() == ArchiveFormat::Dmg {
            Relinker::redirect_libclang(&self.workdir.join(PACKAGE_NAME))?;
        }
        self.reporter.done(&resolution.file_name, "unpacked");
        Ok(())
    }

    async fn build_from_source(
        &self,
        toolchain: Toolchain,
        client: &Client,
    ) -> Result<(), RecipeError> {
        self.reporter.section("Fetching source");
        let source =
            source::acquire_source(self.config, &self.workdir, client, self.reporter).await?;
        toolchain.write_cmake_include(&self.workdir.join(TOOLCHAIN_INCLUDE))?;

        self.reporter.section("Building");
        if !self.verbose {
            self.reporter
                .info(&format!("Build log: {}", self.log_path.display()));
        }

        let platform = self.platform;
        let verbose = self.verbose;
        let log_path = self.log_path.clone();
        let build_dir = self.workdir.join(BUILD_SUBFOLDER);
        let prefix = self.workdir.join(INSTALL_SUBFOLDER);

        tokio::task::spawn_blocking(move || {
            let builder = Builder::new(&toolchain, &platform, verbose, log_path);
            builder.configure(&source, &build_dir, &prefix)?;
            builder.build(&build_dir)?;
            builder.install(&build_dir)
        })
        .await
        .map_err(|e| RecipeError::build("build", format!("task panicked: {e}")))??;

        self.reporter.done("doxygen", "built from source");
        Ok(())
    }

    fn package_info(&self, artifacts: &ArtifactSet) -> PackageInfo {
        PackageInfo {
            name: PACKAGE_NAME.to_string(),
            version: self.config.version.clone(),
            package_id: self.package_id.clone(),
            os: self.platform.os,
            build_arch: self.platform.build_arch,
            target_arch: self.platform.target_arch,
            compiler: self.platform.compiler,
            build_from_source: self.config.build_from_source,
            files: artifacts.clone(),
        }
    }
}
