//! Table client lifecycle.
//!
//! A client socket is registered as soon as it is upgraded, then its read
//! half is watched until the peer goes away. Inbound frames carry no
//! meaning; they only prove the client is still there. Whatever ends the
//! loop, the connection deregisters itself and its write half is closed.

use std::fmt;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::app_state::AppState;
use crate::config::Heartbeat;
use crate::hub::{ConnectionId, ConnectionRegistry};

/// Why a client's read loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    /// The peer closed the socket or the stream ended.
    Closed,
    /// Reading the next frame failed.
    ReadFailed,
    /// No inbound frame within the idle deadline.
    IdleTimeout,
    /// A heartbeat ping could not be written.
    PingFailed,
}

/// Drives an upgraded client socket until it disconnects.
pub async fn serve_client(socket: WebSocket, id: ConnectionId, state: AppState) {
    let (sink, stream) = socket.split();
    let reason = run_client(id, stream, sink, &*state.registry, state.sockets.heartbeat).await;
    tracing::info!(connection_id = %id, ?reason, "client disconnected");
}

/// Registers `sink` under `id`, watches `stream` until it ends, then
/// deregisters and closes the sink.
///
/// Heartbeat pings and the final close are bounded by the registry's send
/// timeout, so a peer that stops reading cannot pin the loop.
pub async fn run_client<St, E, S>(
    id: ConnectionId,
    mut stream: St,
    sink: S,
    registry: &ConnectionRegistry<S>,
    heartbeat: Heartbeat,
) -> Disconnect
where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
    S: Sink<Message> + Unpin + Send,
    S::Error: fmt::Display,
{
    let handle = registry.add(id, sink).await;
    tracing::info!(connection_id = %id, "client connected");

    let mut ticker = heartbeat.is_enabled().then(|| {
        let mut interval =
            tokio::time::interval_at(Instant::now() + heartbeat.interval, heartbeat.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });
    let mut last_seen = Instant::now();

    let reason = loop {
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Close(_))) | None => break Disconnect::Closed,
                Some(Ok(_)) => last_seen = Instant::now(),
                Some(Err(err)) => {
                    tracing::warn!(
                        connection_id = %id,
                        error = %err,
                        "failed to read message from client"
                    );
                    break Disconnect::ReadFailed;
                }
            },
            () = next_tick(ticker.as_mut()) => {
                if is_idle(last_seen.elapsed(), heartbeat.idle_timeout) {
                    tracing::warn!(
                        connection_id = %id,
                        idle_ms = last_seen.elapsed().as_millis(),
                        "client idle past deadline"
                    );
                    break Disconnect::IdleTimeout;
                }
                let ping = async {
                    handle.lock().await.send(Message::Ping(Bytes::new())).await
                };
                match tokio::time::timeout(registry.send_timeout(), ping).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        tracing::warn!(connection_id = %id, error = %err, "failed to ping client");
                        break Disconnect::PingFailed;
                    }
                    Err(_) => {
                        tracing::warn!(connection_id = %id, "timed out pinging client");
                        break Disconnect::PingFailed;
                    }
                }
            }
        }
    };

    registry.remove(id).await;
    let close = async { handle.lock().await.close().await };
    match tokio::time::timeout(registry.send_timeout(), close).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::debug!(connection_id = %id, error = %err, "client socket already closed");
        }
        Err(_) => tracing::debug!(connection_id = %id, "timed out closing client socket"),
    }
    reason
}

fn is_idle(elapsed: Duration, idle_timeout: Duration) -> bool {
    !idle_timeout.is_zero() && elapsed >= idle_timeout
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
