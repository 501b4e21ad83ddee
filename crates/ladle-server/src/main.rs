use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ladle_server::{AppState, ServerConfig, app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::try_from_env()?;
    let services = ladle_interaction::services_from_env()?;
    let state = Arc::new(AppState::new(&config, services));

    tracing::info!(addr = %config.addr, "ladle server listening");
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app(state))
        .await
        .context("server terminated unexpectedly")?;
    Ok(())
}
