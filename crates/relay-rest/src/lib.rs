//! # relay-rest
//!
//! Outbound side of the relay: channel message payloads, the REST client
//! capability and the single-worker dispatcher that serializes every call.

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod requests;

pub use client::{HttpRestClient, RestClient};
pub use dispatcher::OutboundDispatcher;
pub use error::{RestError, RestResult};
pub use requests::{ApiMessage, ChannelSendEmbed, ChannelSendMessage, OutboundRequest};
