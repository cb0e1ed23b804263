//! Relay bridge
//!
//! Both directions of the relay: MESSAGE_CREATE dispatches become game chat
//! lines, and game chat becomes channel messages queued on the dispatcher.

use crate::sinks::{ActivityLog, ChatSink};
use relay_gateway::{DispatchEvent, DispatchHandler, GatewayEventType, MessageCreateEvent};
use relay_rest::{ChannelSendMessage, OutboundDispatcher};
use std::sync::Arc;

/// Where and how game chat is posted
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Relay channel; platform messages from other channels are ignored
    pub channel_id: String,
    /// Post game chat as embeds rather than plain messages
    pub use_embeds: bool,
}

impl BridgeConfig {
    #[must_use]
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            use_embeds: false,
        }
    }

    #[must_use]
    pub fn with_embeds(mut self, use_embeds: bool) -> Self {
        self.use_embeds = use_embeds;
        self
    }
}

pub struct RelayBridge {
    config: BridgeConfig,
    dispatcher: Arc<OutboundDispatcher>,
    chat: Arc<dyn ChatSink>,
    activity: Arc<dyn ActivityLog>,
}

impl RelayBridge {
    pub fn new(
        config: BridgeConfig,
        dispatcher: Arc<OutboundDispatcher>,
        chat: Arc<dyn ChatSink>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            chat,
            activity,
        }
    }

    /// Queue a game chat line for the relay channel
    pub fn relay_game_chat(&self, player: &str, message: &str) {
        let message = ChannelSendMessage::new(
            self.config.channel_id.clone(),
            format!("{player}: {message}"),
        );

        if self.config.use_embeds {
            self.dispatcher.send(&message.into_embed());
        } else {
            self.dispatcher.send(&message);
        }
    }

    fn on_message_create(&self, event: &DispatchEvent) {
        let Some(message) = event.as_message_create() else {
            tracing::debug!(seq = ?event.sequence, "Unreadable MESSAGE_CREATE");
            return;
        };

        if !self.should_relay(&message) {
            return;
        }

        let line = format!(
            "(Discord) {}: {}",
            message.author.username, message.content
        );
        self.activity.log_activity(&line);
        self.chat.broadcast(&line);
    }

    fn should_relay(&self, message: &MessageCreateEvent) -> bool {
        // Our own relayed messages come back as bot messages
        if message.author.bot {
            return false;
        }
        if message
            .channel_id
            .as_deref()
            .is_some_and(|id| id != self.config.channel_id)
        {
            return false;
        }
        !message.content.is_empty()
    }
}

impl DispatchHandler for RelayBridge {
    fn handle_dispatch(&self, event: &DispatchEvent) {
        match event.kind() {
            Some(GatewayEventType::MessageCreate) => self.on_message_create(event),
            _ => tracing::trace!(event_type = %event.event_type, "Ignoring dispatch"),
        }
    }
}

impl std::fmt::Debug for RelayBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayBridge")
            .field("config", &self.config)
            .finish()
    }
}
