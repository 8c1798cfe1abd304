//! Dealer relay loop.
//!
//! Every data frame read from the dealer is broadcast before the next one
//! is read, so clients see frames in the order the dealer sent them and a
//! slow broadcast backpressures the dealer's socket.

use std::fmt;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, Stream, StreamExt};

use crate::app_state::AppState;
use crate::hub::{ConnectionRegistry, DealerLease, Frame};

/// Drives the attached dealer's socket until it disconnects, then frees
/// the dealer seat.
pub async fn serve_dealer(socket: WebSocket, lease: DealerLease, state: AppState) {
    tracing::info!("dealer connected");
    let relayed = run_dealer(socket, &*state.registry).await;
    drop(lease);
    tracing::info!(frames = relayed, "dealer disconnected");
}

/// Reads frames from `stream` and broadcasts each to `registry`.
///
/// Returns the number of frames relayed once the stream closes or fails.
pub async fn run_dealer<St, E, S>(mut stream: St, registry: &ConnectionRegistry<S>) -> u64
where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
    S: Sink<Message> + Unpin + Send,
    S::Error: fmt::Display,
{
    let mut relayed: u64 = 0;
    loop {
        match stream.next().await {
            Some(Ok(Message::Close(_))) | None => {
                tracing::debug!("dealer closed connection");
                break;
            }
            Some(Ok(message)) => {
                let Some(frame) = Frame::from_message(message) else {
                    continue;
                };
                let report = registry.broadcast(&frame).await;
                relayed = relayed.saturating_add(1);
                tracing::debug!(
                    kind = frame.kind().as_str(),
                    bytes = frame.len(),
                    recipients = report.recipients,
                    failed = report.failed(),
                    "relayed dealer frame"
                );
            }
            Some(Err(err)) => {
                tracing::warn!(error = %err, "failed to read message from dealer's websocket");
                break;
            }
        }
    }
    relayed
}
