//! blackjack-relay server entry point.
//!
//! Starts the Axum HTTP server with the relay WebSocket endpoints.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use blackjack_relay::app_state::AppState;
use blackjack_relay::config::{LogFormat, RelayConfig};
use blackjack_relay::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting blackjack-relay");

    // Build application state
    let state = AppState::new(config.sockets);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(
        addr = %config.listen_addr,
        heartbeat_secs = config.sockets.heartbeat.interval.as_secs(),
        "server listening"
    );

    server::serve(listener, state)
        .await
        .context("server terminated")?;

    Ok(())
}
