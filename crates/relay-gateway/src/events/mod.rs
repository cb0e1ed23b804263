//! Gateway events
//!
//! Dispatch (op 0) events as handed to the chat bridge.

mod dispatch;
mod event_types;
mod payloads;

pub use dispatch::{DispatchEvent, DispatchHandler};
pub use event_types::GatewayEventType;
pub use payloads::{AuthorPayload, MessageCreateEvent, ReadyEvent};
