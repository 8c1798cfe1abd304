//! WebSocket layer: upgrade handlers and the per-role connection loops.
//!
//! | Path            | Role                                   |
//! |-----------------|----------------------------------------|
//! | `/ws/blackjack` | table client, receives dealer frames   |
//! | `/ws/dealer`    | dealer console, source of every frame  |
//! | `/ws/scanner`   | scanner station, reserved              |

pub mod client;
pub mod dealer;
pub mod handler;
pub mod scanner;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;

pub use handler::routes;

/// Write half of an upgraded client socket, as held by the registry.
pub type ClientSink = SplitSink<WebSocket, Message>;
