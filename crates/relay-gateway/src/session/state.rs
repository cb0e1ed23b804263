//! Session state types

use crate::protocol::CloseCode;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No connection has been opened yet
    Disconnected,
    /// Transport open, waiting for the server's Hello
    AwaitingHello,
    /// Hello received, Identify being sent
    Identifying,
    /// Identify sent, dispatches flowing
    Ready,
    /// Connection ended; a new `connect` starts a fresh session
    Closed,
}

impl SessionState {
    /// Check if a connection is open
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::AwaitingHello | Self::Identifying | Self::Ready)
    }
}

/// Why a session entered `Closed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// `close()` was called
    Requested,
    /// The transport ended or failed
    TransportClosed { code: Option<u16>, reason: String },
    /// The server sent op 7 (Reconnect)
    ReconnectRequested,
    /// The server sent op 9 (Invalid Session)
    InvalidSession { resumable: bool },
}

impl CloseReason {
    /// The platform close code, if the transport reported one
    #[must_use]
    pub fn close_code(&self) -> Option<CloseCode> {
        match self {
            Self::TransportClosed {
                code: Some(code), ..
            } => CloseCode::from_u16(*code),
            _ => None,
        }
    }

    /// Check if a new session is worth opening after this close
    #[must_use]
    pub fn should_reconnect(&self) -> bool {
        match self {
            Self::Requested => false,
            Self::TransportClosed { .. } => self
                .close_code()
                .map_or(true, CloseCode::should_reconnect),
            Self::ReconnectRequested | Self::InvalidSession { .. } => true,
        }
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Requested => write!(f, "close requested"),
            Self::TransportClosed {
                code: Some(code),
                reason,
            } => write!(f, "transport closed ({code}): {reason}"),
            Self::TransportClosed { code: None, reason } => {
                write!(f, "transport closed: {reason}")
            }
            Self::ReconnectRequested => write!(f, "server requested reconnect"),
            Self::InvalidSession { resumable } => {
                write!(f, "invalid session (resumable={resumable})")
            }
        }
    }
}

/// Last observed dispatch sequence number
///
/// Written by the read loop, read by the heartbeat task. Never decreases.
#[derive(Debug, Default)]
pub struct SequenceTracker {
    // Stores sequence + 1 so that 0 can mean "nothing observed yet"
    raw: AtomicU64,
}

impl SequenceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sequence number from a dispatch frame
    pub fn observe(&self, sequence: u64) {
        self.raw
            .fetch_max(sequence.saturating_add(1), Ordering::SeqCst);
    }

    /// The highest sequence observed so far
    #[must_use]
    pub fn get(&self) -> Option<u64> {
        match self.raw.load(Ordering::SeqCst) {
            0 => None,
            raw => Some(raw - 1),
        }
    }
}
