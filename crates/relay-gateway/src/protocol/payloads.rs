//! Payload definitions
//!
//! The `d` bodies of the op codes this client produces or consumes.

use super::Intents;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// op 10 body, the first frame on every connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Milliseconds
    #[serde(deserialize_with = "lenient_u64")]
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }

    /// Parse the Hello body out of a message's `d` field
    pub fn from_data(data: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(data)
    }
}

// Intervals have been seen on the wire both as numbers and as numeric strings.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| de::Error::custom(format!("expected unsigned integer, got {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected numeric string, got {s:?}"))),
        other => Err(de::Error::custom(format!("expected integer, got {other}"))),
    }
}

/// op 2 body, sent once per connection in reply to Hello
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Bot token
    pub token: String,

    /// Requested event categories
    pub intents: Intents,

    pub properties: IdentifyProperties,

    /// Presence to show as soon as the session is ready
    pub presence: PresencePayload,
}

/// Who is connecting, as reported in Identify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    pub os: String,
    /// Client library name
    pub browser: String,
    pub device: String,
}

impl IdentifyProperties {
    /// Properties for a client called `name` on the host OS
    #[must_use]
    pub fn for_client(name: &str) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: name.to_string(),
            device: name.to_string(),
        }
    }

    #[must_use]
    pub fn relay() -> Self {
        Self::for_client("chat-relay")
    }
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self::relay()
    }
}

/// Payload for op 3 (Status Update), also embedded in Identify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresencePayload {
    pub activities: Vec<Activity>,
    pub status: String,
    pub afk: bool,
}

impl PresencePayload {
    /// An online presence with a single "playing" activity
    #[must_use]
    pub fn online(activity_name: impl Into<String>) -> Self {
        Self {
            activities: vec![Activity::playing(activity_name)],
            status: "online".to_string(),
            afk: false,
        }
    }
}

/// A single presence activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

impl Activity {
    /// Activity type shown as "Playing {name}"
    pub const PLAYING: u8 = 0;

    #[must_use]
    pub fn playing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Self::PLAYING,
        }
    }
}
