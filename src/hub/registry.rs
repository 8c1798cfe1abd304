//! Live client registry and the dealer→clients fan-out.
//!
//! [`ConnectionRegistry`] maps each registered client's [`ConnectionId`] to
//! the write half of its socket. The outer map is guarded by a single
//! [`tokio::sync::RwLock`]; every write half sits behind its own
//! [`tokio::sync::Mutex`] so a broadcast and the owning connection's
//! heartbeat never interleave on the same socket.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures_util::future::join_all;
use futures_util::{Sink, SinkExt};
use tokio::sync::{Mutex, RwLock};

use super::{ConnectionId, Frame};

/// Default upper bound on a single per-client write during a broadcast.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared handle to one client's write half.
pub type ClientHandle<S> = Arc<Mutex<S>>;

/// Outcome of one [`ConnectionRegistry::broadcast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastReport {
    /// Number of clients in the snapshot the frame was sent to.
    pub recipients: usize,
    /// Number of clients whose write completed without error.
    pub delivered: usize,
}

impl BroadcastReport {
    /// Number of recipients whose write failed or timed out.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.recipients.saturating_sub(self.delivered)
    }
}

/// Set of live client connections.
///
/// # Concurrency
///
/// - [`add`](Self::add) and [`remove`](Self::remove) take the write lock.
/// - [`broadcast`](Self::broadcast) takes the read lock only long enough to
///   clone the member handles, then writes without holding it.
///
/// Membership is changed only by the owning connection's lifecycle. A
/// failed broadcast write never removes a member; the connection's own
/// read loop notices the broken socket and deregisters itself.
pub struct ConnectionRegistry<S> {
    clients: RwLock<HashMap<ConnectionId, ClientHandle<S>>>,
    send_timeout: Duration,
}

impl<S> ConnectionRegistry<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: fmt::Display,
{
    /// Creates an empty registry whose broadcast writes give up after
    /// `send_timeout`.
    #[must_use]
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            send_timeout,
        }
    }

    /// Registers a client's write half under `id`.
    ///
    /// Idempotent: if `id` is already registered the existing handle is
    /// kept and returned, and `sink` is dropped.
    pub async fn add(&self, id: ConnectionId, sink: S) -> ClientHandle<S> {
        let mut map = self.clients.write().await;
        let handle = map
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(sink)));
        Arc::clone(handle)
    }

    /// Deregisters `id`. Returns `false` if it was not a member.
    pub async fn remove(&self, id: ConnectionId) -> bool {
        self.clients.write().await.remove(&id).is_some()
    }

    /// Returns `true` if `id` is currently registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.clients.read().await.contains_key(&id)
    }

    /// Point-in-time copy of the current members.
    pub async fn snapshot(&self) -> Vec<(ConnectionId, ClientHandle<S>)> {
        self.clients
            .read()
            .await
            .iter()
            .map(|(id, handle)| (*id, Arc::clone(handle)))
            .collect()
    }

    /// Upper bound on a single write to one client.
    #[must_use]
    pub const fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Number of registered clients.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Returns `true` if no client is registered.
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }

    /// Writes `frame` to every registered client.
    ///
    /// Writes to the snapshot run concurrently and the call returns once
    /// every write has finished, failed, or timed out. A failure on one
    /// recipient is logged and does not affect the others. The operation
    /// itself never fails.
    pub async fn broadcast(&self, frame: &Frame) -> BroadcastReport {
        let recipients = self.snapshot().await;
        if recipients.is_empty() {
            return BroadcastReport::default();
        }

        let sends = recipients.iter().map(|(id, handle)| {
            let message = Message::from(frame.clone());
            self.send_to(*id, handle, message)
        });
        let delivered = join_all(sends).await.into_iter().filter(|ok| *ok).count();

        BroadcastReport {
            recipients: recipients.len(),
            delivered,
        }
    }

    async fn send_to(&self, id: ConnectionId, handle: &ClientHandle<S>, message: Message) -> bool {
        let write = async {
            let mut sink = handle.lock().await;
            sink.send(message).await
        };
        match tokio::time::timeout(self.send_timeout, write).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                tracing::warn!(
                    connection_id = %id,
                    error = %err,
                    "failed to send frame to client from broadcast"
                );
                false
            }
            Err(_) => {
                tracing::warn!(
                    connection_id = %id,
                    timeout_ms = self.send_timeout.as_millis(),
                    "timed out sending frame to client from broadcast"
                );
                false
            }
        }
    }
}

impl<S> Default for ConnectionRegistry<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: fmt::Display,
{
    fn default() -> Self {
        Self::new(DEFAULT_SEND_TIMEOUT)
    }
}

impl<S> fmt::Debug for ConnectionRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("send_timeout", &self.send_timeout)
            .finish_non_exhaustive()
    }
}
