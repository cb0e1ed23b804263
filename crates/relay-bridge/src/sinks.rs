//! Game-side sinks
//!
//! The bridge never talks to the game server directly; it writes relay lines
//! into these.

/// Broadcasts a line to every player in game chat
pub trait ChatSink: Send + Sync {
    fn broadcast(&self, text: &str);
}

/// Records relay traffic in the server's activity log
pub trait ActivityLog: Send + Sync {
    fn log_activity(&self, text: &str);
}

/// Writes game chat to the `game_chat` tracing target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingChatSink;

impl ChatSink for TracingChatSink {
    fn broadcast(&self, text: &str) {
        tracing::info!(target: "game_chat", "{text}");
    }
}

/// Writes activity to the `relay_activity` tracing target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActivityLog;

impl ActivityLog for TracingActivityLog {
    fn log_activity(&self, text: &str) {
        tracing::info!(target: "relay_activity", "{text}");
    }
}
