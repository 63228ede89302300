//! quakehub entry point.
//!
//! Parses the CLI and dispatches; with no subcommand it starts the HTTP
//! server.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use quakehub::cli::{Cli, run};
use quakehub::config::HubConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = HubConfig::from_env()?;
    let cli = Cli::parse();
    run(config, cli.command).await?;

    Ok(())
}
