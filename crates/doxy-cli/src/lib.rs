//! doxy - fetch, build and package doxygen
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Produces a directory holding `bin/doxygen` (plus its companion tools) for
//! a given platform, either from the upstream prebuilt archives or by
//! compiling the release source with CMake.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.doxy/
//! ├── packages/<version>/<id>/   # Packaged output (bin/, doxy-package.json, doxy-env.*)
//! ├── build/<version>-<id>/      # Work directories
//! └── logs/                      # Build logs
//! ```

pub mod cmd;
pub mod config;
pub mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use doxy_core::env::Shell;
use doxy_schema::{Arch, Compiler, Os};

#[derive(Debug, Parser)]
#[command(name = "doxy")]
#[command(author, version = env!("DOXY_VERSION"), about = "doxy - fetch, build and package doxygen")]
pub struct Cli {
    /// Recipe overrides (version, checksums, mirrors, extra patches)
    #[arg(long, global = true, env = "DOXY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Platform selection shared by `resolve` and `install`.
#[derive(Debug, Clone, clap::Args)]
pub struct PlatformArgs {
    /// Operating system the package is for (default: host)
    #[arg(long, env = "DOXY_OS")]
    pub os: Option<Os>,
    /// Architecture of the build machine (default: host)
    #[arg(long, env = "DOXY_ARCH")]
    pub arch: Option<Arch>,
    /// Architecture the consumer targets (default: --arch)
    #[arg(long, env = "DOXY_TARGET_ARCH")]
    pub target_arch: Option<Arch>,
    /// Compiler for source builds (default: the OS's usual compiler)
    #[arg(long, env = "DOXY_COMPILER")]
    pub compiler: Option<Compiler>,
    /// Doxygen version (overrides the config file)
    #[arg(long = "doxygen-version", env = "DOXY_DOXYGEN_VERSION")]
    pub version: Option<String>,
    /// Compile from source instead of using a prebuilt archive
    #[arg(long)]
    pub build_from_source: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show which archive and URLs a platform resolves to (no downloads)
    Resolve {
        #[command(flatten)]
        platform: PlatformArgs,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch or build doxygen and package it
    Install {
        #[command(flatten)]
        platform: PlatformArgs,
        /// Package root (default: ~/.doxy/packages/<version>/<id>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Work directory (default: ~/.doxy/build/<version>-<id>)
        #[arg(long)]
        workdir: Option<PathBuf>,
        /// Skip TLS certificate verification for downloads
        #[arg(long)]
        insecure: bool,
        /// Stream build tool output instead of writing the build log
        #[arg(short, long)]
        verbose: bool,
        /// Do not run `doxygen --version` after packaging
        #[arg(long)]
        skip_test: bool,
    },
    /// Run `doxygen --version` from a packaged output
    Test {
        /// Package root containing bin/ and doxy-package.json
        package: PathBuf,
    },
    /// Print the PATH line for a packaged output
    Env {
        /// Package root containing bin/
        package: PathBuf,
        /// Shell dialect: sh, cmd or powershell
        #[arg(long, default_value = "sh")]
        shell: Shell,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
