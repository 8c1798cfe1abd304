//! # blackjack-relay
//!
//! Real-time relay for a browser blackjack table. One dealer console pushes
//! game-state frames over a WebSocket and every connected table client
//! receives each frame, unchanged and in order.
//!
//! ## Architecture
//!
//! ```text
//! Dealer socket ──► Dealer loop (ws/dealer)
//!                      │ one frame at a time
//!                      ▼
//!               ConnectionRegistry::broadcast (hub/)
//!                      │ snapshot, concurrent writes
//!                      ▼
//!   Client sockets ◄── registered / deregistered by client loops (ws/client)
//! ```
//!
//! The registry is the only shared mutable state. A client's membership is
//! changed only by that client's own loop; a failed broadcast write is
//! logged and left for the owning loop to notice.

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod hub;
pub mod server;
pub mod ws;
