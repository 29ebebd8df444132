//! depset - resolve repository dependency sets

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use depset_cli::cmd;
use depset_cli::cmd::resolve::ResolveOptions;
use depset_cli::config::Config;
use depset_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Resolve {
            roots,
            version,
            channel,
            apps,
            source,
            json,
        } => {
            let options = ResolveOptions {
                roots,
                version,
                channel,
                apps,
                source,
                json,
            };
            cmd::resolve::resolve(&config, options).await
        }
        Commands::Inspect { files } => cmd::inspect::inspect(&config, &files).await,
    }
}
