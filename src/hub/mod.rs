//! Hub layer: connection identity, relay frames, the client registry with
//! its broadcast fan-out, and the exclusive dealer slot.

pub mod connection_id;
pub mod dealer_slot;
pub mod frame;
pub mod registry;

pub use connection_id::ConnectionId;
pub use dealer_slot::{DealerLease, DealerSlot};
pub use frame::{Frame, FrameKind};
pub use registry::{BroadcastReport, ClientHandle, ConnectionRegistry};
