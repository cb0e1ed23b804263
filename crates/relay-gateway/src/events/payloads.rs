//! Event payload definitions
//!
//! Only the fields the relay reads; everything else in `d` is ignored.

use serde::{Deserialize, Serialize};

/// READY event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyEvent {
    /// Gateway protocol version
    pub v: u8,

    /// The bot user this session is logged in as
    pub user: AuthorPayload,

    /// Session ID (kept for logging; resume is not supported)
    pub session_id: String,
}

/// MESSAGE_CREATE event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreateEvent {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub channel_id: Option<String>,

    pub author: AuthorPayload,

    #[serde(default)]
    pub content: String,
}

/// Message author / user object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorPayload {
    #[serde(default)]
    pub id: Option<String>,

    pub username: String,

    #[serde(default)]
    pub bot: bool,
}
