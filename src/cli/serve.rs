//! `solaris serve` command.

use anyhow::{Context, Result};
use solaris::api::{start_server, AppState};
use solaris::config::Config;

/// Apply CLI overrides, wire the application state and serve until Ctrl-C.
pub async fn cmd_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = AppState::from_config(&config)
        .await
        .context("Failed to initialize application state")?;

    let configured = state.router.registry().configured();
    if configured.is_empty() {
        tracing::warn!("No provider credentials configured; chat requests will fail with 503");
    }
    println!("Solaris API: http://{}", config.bind_addr());

    start_server(&config, state)
        .await
        .with_context(|| format!("Server on {} failed", config.bind_addr()))
}
