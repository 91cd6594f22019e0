mod commands;

use anyhow::Context as _;
use asistencia::api::ApiClient;
use asistencia::config::Config;
use asistencia::init_tracing::{init_tracing, shutdown_tracing};
use clap::Parser;
use tracing::debug;

use commands::{Cli, Context};

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::read(cli.config.as_deref())?;
    debug!("Using API at {}", config.api.base_url);

    let api = ApiClient::new(&config.api).context("Creating API client")?;
    let ctx = Context { config, api };

    commands::run(&ctx, cli.command).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let result = match init_tracing().context("Setting up tracing") {
        Ok(()) => run(cli).await,
        Err(e) => Err(e),
    };
    shutdown_tracing();
    result
}
