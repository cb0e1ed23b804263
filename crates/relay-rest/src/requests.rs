//! Outbound API messages
//!
//! Each message knows its request path and JSON body. The dispatcher only
//! ever sees the resulting [`OutboundRequest`].

use serde::Serialize;
use serde_json::{json, Value};

/// A fully built API call, ready to be queued
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundRequest {
    /// Path below the API base, starting with `/`
    pub path: String,
    /// JSON body
    pub body: Value,
}

impl OutboundRequest {
    #[must_use]
    pub fn new(path: impl Into<String>, body: Value) -> Self {
        Self {
            path: path.into(),
            body,
        }
    }
}

/// A message that can be turned into an outbound request
pub trait ApiMessage {
    /// Request path, e.g. `/channels/123/messages`
    fn path(&self) -> String;

    /// Request body
    fn to_json(&self) -> Value;

    fn to_request(&self) -> OutboundRequest {
        OutboundRequest::new(self.path(), self.to_json())
    }
}

/// Post a plain text message to a channel
///
/// Mentions are limited to users and roles so relayed text can never ping
/// `@everyone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSendMessage {
    pub channel_id: String,
    pub content: String,
}

impl ChannelSendMessage {
    #[must_use]
    pub fn new(channel_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            content: content.into(),
        }
    }

    /// Same target, sent as an embed
    #[must_use]
    pub fn into_embed(self) -> ChannelSendEmbed {
        ChannelSendEmbed { message: self }
    }
}

impl ApiMessage for ChannelSendMessage {
    fn path(&self) -> String {
        format!("/channels/{}/messages", self.channel_id)
    }

    fn to_json(&self) -> Value {
        json!({
            "content": self.content,
            "allowed_mentions": { "parse": ["users", "roles"] },
        })
    }
}

/// Post a message to a channel as an embed with the text as its description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSendEmbed {
    message: ChannelSendMessage,
}

impl ChannelSendEmbed {
    #[must_use]
    pub fn new(channel_id: impl Into<String>, description: impl Into<String>) -> Self {
        ChannelSendMessage::new(channel_id, description).into_embed()
    }

    #[must_use]
    pub fn channel_id(&self) -> &str {
        &self.message.channel_id
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.message.content
    }
}

impl ApiMessage for ChannelSendEmbed {
    fn path(&self) -> String {
        self.message.path()
    }

    fn to_json(&self) -> Value {
        let mut body = self.message.to_json();
        if let Value::Object(fields) = &mut body {
            fields.remove("content");
            fields.insert(
                "embed".to_string(),
                json!({ "description": self.message.content }),
            );
        }
        body
    }
}
