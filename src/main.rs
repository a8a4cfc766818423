//! Solaris CLI entry point.
//!
//! - `solaris serve [--host H] [--port P] [--json-logs]` - run the HTTP API
//! - `solaris providers` - list configured providers
//! - `solaris models <provider>` - list known models

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use solaris::config::Config;

const DEFAULT_LOG_FILTER: &str = "solaris=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let json_logs = matches!(cli.command, Commands::Serve { json_logs: true, .. });
    init_logging(json_logs);

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve { host, port, .. } => cli::serve::cmd_serve(config, host, port).await,
        Commands::Providers => cli::catalog::cmd_providers(&config),
        Commands::Models { provider } => cli::catalog::cmd_models(&provider),
    }
}

fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
