//! Test fixtures and data generators
//!
//! Gateway frames as the platform sends them, and a relay configuration
//! pointing at the in-process fakes.

use std::collections::HashMap;

use relay_common::{ConfigError, RelayConfig};
use serde_json::{json, Value};

pub const TEST_TOKEN: &str = "test-bot-token";
pub const TEST_CHANNEL: &str = "1100";

/// op 10
pub fn hello(heartbeat_ms: u64) -> Value {
    json!({"op": 10, "d": {"heartbeat_interval": heartbeat_ms}, "s": null, "t": null})
}

/// op 11
pub fn heartbeat_ack() -> Value {
    json!({"op": 11, "d": null})
}

/// op 0
pub fn dispatch(seq: u64, event_type: &str, data: Value) -> Value {
    json!({"op": 0, "s": seq, "t": event_type, "d": data})
}

pub fn ready(seq: u64) -> Value {
    dispatch(
        seq,
        "READY",
        json!({
            "v": 10,
            "user": {"id": "900", "username": "relay-bot", "bot": true},
            "session_id": "abc123"
        }),
    )
}

/// A MESSAGE_CREATE in `channel_id` from `username`
pub fn message_create(seq: u64, channel_id: &str, username: &str, content: &str, bot: bool) -> Value {
    dispatch(
        seq,
        "MESSAGE_CREATE",
        json!({
            "id": format!("m{seq}"),
            "channel_id": channel_id,
            "author": {"id": "42", "username": username, "bot": bot},
            "content": content
        }),
    )
}

/// Relay configuration against a fake gateway and API
pub fn relay_config(gateway_url: &str, api_base: &str) -> Result<RelayConfig, ConfigError> {
    let vars: HashMap<&str, String> = HashMap::from([
        ("RELAY_BOT_TOKEN", TEST_TOKEN.to_string()),
        ("RELAY_CHANNEL_ID", TEST_CHANNEL.to_string()),
        ("RELAY_GATEWAY_URL", gateway_url.to_string()),
        ("RELAY_API_BASE", api_base.to_string()),
        ("RELAY_STATUS", "a test server".to_string()),
        ("RELAY_RECONNECT_DELAY_MS", "50".to_string()),
        ("RELAY_HTTP_TIMEOUT_SECS", "5".to_string()),
    ]);

    RelayConfig::from_lookup(|key| vars.get(key).cloned())
}
