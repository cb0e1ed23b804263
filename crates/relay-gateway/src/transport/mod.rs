//! Gateway transport
//!
//! The session never touches a socket directly. A transport connects and
//! hands back a pair of channels: text frames to write, and inbound frames
//! (or the final close) to read.

mod websocket;

pub use websocket::WebSocketTransport;

use crate::error::TransportError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Something read off the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// One complete data frame
    Data(Vec<u8>),
    /// The connection ended; nothing follows
    Closed { code: Option<u16>, reason: String },
}

/// Both directions of a live connection
///
/// Dropping `outbound` closes the connection. When the connection ends,
/// `inbound` yields a final [`InboundFrame::Closed`] or simply ends.
#[derive(Debug)]
pub struct TransportChannels {
    pub outbound: mpsc::Sender<String>,
    pub inbound: mpsc::Receiver<InboundFrame>,
}

/// Opens gateway connections
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn connect(&self, url: &str) -> Result<TransportChannels, TransportError>;
}
