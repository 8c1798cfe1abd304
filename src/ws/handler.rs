//! Axum WebSocket upgrade handlers, one per role.
//!
//! The role of a socket is decided by the path it upgrades on. A request
//! that cannot be upgraded is answered with `500` on every path.

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use super::client::serve_client;
use super::dealer::serve_dealer;
use super::scanner::serve_scanner;
use crate::app_state::AppState;
use crate::config::SocketSettings;
use crate::error::RelayError;
use crate::hub::ConnectionId;

/// `GET /ws/blackjack` — Upgrade a table client.
///
/// # Errors
///
/// Returns [`RelayError::UpgradeFailed`] if the handshake is malformed.
pub async fn client_ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    let ws = accept(ws, "client", &state.sockets)?;
    let id = ConnectionId::new();

    Ok(ws
        .on_failed_upgrade(move |err: axum::Error| {
            tracing::warn!(
                connection_id = %id,
                error = %err,
                "failed connection to the client's websocket"
            );
        })
        .on_upgrade(move |socket| serve_client(socket, id, state))
        .into_response())
}

/// `GET /ws/dealer` — Upgrade the dealer console.
///
/// # Errors
///
/// Returns [`RelayError::UpgradeFailed`] if the handshake is malformed and
/// [`RelayError::DealerBusy`] if another dealer is attached.
pub async fn dealer_ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    let ws = accept(ws, "dealer", &state.sockets)?;
    let Some(lease) = state.dealer.try_acquire() else {
        tracing::warn!("rejected dealer connection: seat already taken");
        return Err(RelayError::DealerBusy);
    };

    // the lease travels with the upgrade callback and is freed if it never runs
    Ok(ws
        .on_failed_upgrade(|err: axum::Error| {
            tracing::warn!(error = %err, "failed connection to the dealer's websocket");
        })
        .on_upgrade(move |socket| serve_dealer(socket, lease, state))
        .into_response())
}

/// `GET /ws/scanner` — Upgrade a scanner station.
///
/// # Errors
///
/// Returns [`RelayError::UpgradeFailed`] if the handshake is malformed.
pub async fn scanner_ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    let ws = accept(ws, "scanner", &state.sockets)?;
    let id = ConnectionId::new();

    Ok(ws
        .on_failed_upgrade(move |err: axum::Error| {
            tracing::warn!(
                connection_id = %id,
                error = %err,
                "failed connection to the scanner's websocket"
            );
        })
        .on_upgrade(move |socket| serve_scanner(socket, id))
        .into_response())
}

fn accept(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    role: &'static str,
    sockets: &SocketSettings,
) -> Result<WebSocketUpgrade, RelayError> {
    let ws = ws.map_err(|rejection| {
        tracing::warn!(role, error = %rejection, "websocket upgrade rejected");
        RelayError::UpgradeFailed(rejection.to_string())
    })?;
    Ok(ws.max_message_size(sockets.max_frame_bytes))
}

/// WebSocket routes for every role.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ws/blackjack", get(client_ws_handler))
        .route("/ws/dealer", get(dealer_ws_handler))
        .route("/ws/scanner", get(scanner_ws_handler))
}
