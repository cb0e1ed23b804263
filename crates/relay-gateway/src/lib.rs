//! # relay-gateway
//!
//! Client side of the chat platform's real-time gateway: frame codec,
//! identify/presence payloads, heartbeat scheduling and the session state machine.

pub mod error;
pub mod events;
pub mod heartbeat;
pub mod protocol;
pub mod session;
pub mod transport;

pub use error::{DecodeError, GatewayError, GatewayResult, TransportError};
pub use events::{DispatchEvent, DispatchHandler, GatewayEventType, MessageCreateEvent};
pub use heartbeat::HeartbeatScheduler;
pub use protocol::{CloseCode, GatewayMessage, Intents, OpCode};
pub use session::{CloseReason, GatewaySession, SessionConfig, SessionState, StatusProvider};
pub use transport::{GatewayTransport, InboundFrame, TransportChannels, WebSocketTransport};
