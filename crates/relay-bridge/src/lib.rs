//! # relay-bridge
//!
//! Glue between the game server and the chat platform: platform messages
//! become game chat, game chat becomes channel messages, and the gateway
//! session is kept alive across disconnects.

pub mod bridge;
pub mod service;
pub mod sinks;
pub mod status;

pub use bridge::{BridgeConfig, RelayBridge};
pub use service::{ReconnectPolicy, RelayHandle, RelayService};
pub use sinks::{ActivityLog, ChatSink, TracingActivityLog, TracingChatSink};
pub use status::StatusText;
