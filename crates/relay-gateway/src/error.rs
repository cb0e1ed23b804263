//! Gateway error types

use crate::session::SessionState;
use relay_common::RelayError;
use thiserror::Error;

/// A single inbound frame could not be decoded
///
/// Never fatal to the session: the frame is logged and dropped.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Frame is not a JSON object
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Frame has no `op` field
    #[error("Missing opcode")]
    MissingOpcode,

    /// `op` is neither a number nor a numeric string
    #[error("Invalid opcode value: {0}")]
    InvalidOpcode(String),
}

/// Transport-level failures
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connecting or the WebSocket handshake failed
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The connection is gone; outbound frames can no longer be written
    #[error("Connection closed")]
    Closed,
}

/// Gateway session error type
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Operation not allowed in the current session state
    #[error("Invalid session state: {0:?}")]
    InvalidState(SessionState),

    /// `HeartbeatScheduler::start` called while already running
    #[error("Heartbeat already running")]
    HeartbeatAlreadyRunning,

    /// No live connection
    #[error("Not connected")]
    NotConnected,
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<GatewayError> for RelayError {
    fn from(err: GatewayError) -> Self {
        Self::Gateway(err.to_string())
    }
}
