//! doxy - fetch, build and package doxygen

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use doxy_cli::cmd;
use doxy_cli::cmd::install::InstallOptions;
use doxy_cli::ui::ConsoleReporter;
use doxy_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr, controlled by RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let reporter = ConsoleReporter::new(cli.quiet);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Resolve { platform, json } => cmd::resolve::resolve(config, &platform, json),
        Commands::Install {
            platform,
            output,
            workdir,
            insecure,
            verbose,
            skip_test,
        } => {
            let opts = InstallOptions {
                output,
                workdir,
                insecure,
                verbose,
                skip_test,
            };
            cmd::install::install(config, &platform, &opts, &reporter).await
        }
        Commands::Test { package } => cmd::test::test(&package, &reporter),
        Commands::Env { package, shell } => cmd::env::env(&package, shell),
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}
