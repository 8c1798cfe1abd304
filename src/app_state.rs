//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::SocketSettings;
use crate::hub::{ConnectionRegistry, DealerSlot};
use crate::ws::ClientSink;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live table clients and the broadcast fan-out.
    pub registry: Arc<ConnectionRegistry<ClientSink>>,
    /// The single dealer seat.
    pub dealer: Arc<DealerSlot>,
    /// Per-socket tuning.
    pub sockets: SocketSettings,
}

impl AppState {
    /// Builds fresh state with an empty registry and a free dealer seat.
    #[must_use]
    pub fn new(sockets: SocketSettings) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new(sockets.send_timeout)),
            dealer: Arc::new(DealerSlot::new()),
            sockets,
        }
    }
}
