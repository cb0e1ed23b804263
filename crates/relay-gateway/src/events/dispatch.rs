//! Dispatch events and the handler seam

use super::{GatewayEventType, MessageCreateEvent};
use serde_json::Value;

/// A decoded op 0 frame, in wire order
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchEvent {
    /// Event name from `t` (empty when the frame had none)
    pub event_type: String,
    /// Sequence number from `s`
    pub sequence: Option<u64>,
    /// Raw event body from `d`
    pub data: Value,
}

impl DispatchEvent {
    /// The known event type, if any
    #[must_use]
    pub fn kind(&self) -> Option<GatewayEventType> {
        self.event_type.parse().ok()
    }

    /// Parse as MESSAGE_CREATE
    pub fn as_message_create(&self) -> Option<MessageCreateEvent> {
        if self.kind() != Some(GatewayEventType::MessageCreate) {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }
}

/// Receives dispatch events from the gateway read loop
///
/// Called inline on the read loop, one event at a time and in wire order.
/// Implementations must return quickly; long work delays the next frame.
pub trait DispatchHandler: Send + Sync {
    fn handle_dispatch(&self, event: &DispatchEvent);
}

impl<F> DispatchHandler for F
where
    F: Fn(&DispatchEvent) + Send + Sync,
{
    fn handle_dispatch(&self, event: &DispatchEvent) {
        self(event);
    }
}
