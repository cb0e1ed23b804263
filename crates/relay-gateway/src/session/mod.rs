//! Gateway session
//!
//! One live gateway connection: handshake, heartbeats, sequence tracking and
//! dispatch routing.

mod connection;
mod session;
mod state;

pub use session::{GatewaySession, SessionConfig, StatusProvider};
pub use state::{CloseReason, SequenceTracker, SessionState};
