//! Scanner station socket.
//!
//! The route is reserved for barcode scanner stations. Frames are accepted
//! and discarded; nothing is relayed.

use axum::extract::ws::{Message, WebSocket};

use crate::hub::ConnectionId;

/// Drains an upgraded scanner socket until it closes.
pub async fn serve_scanner(mut socket: WebSocket, id: ConnectionId) {
    tracing::info!(connection_id = %id, "scanner connected");
    let mut discarded: u64 = 0;
    loop {
        match socket.recv().await {
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => discarded = discarded.saturating_add(1),
            Some(Err(err)) => {
                tracing::warn!(
                    connection_id = %id,
                    error = %err,
                    "failed to read message from scanner"
                );
                break;
            }
        }
    }
    tracing::info!(connection_id = %id, discarded, "scanner disconnected");
}
