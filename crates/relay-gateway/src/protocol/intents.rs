//! Gateway intents bitflags
//!
//! Selects which event categories the gateway will deliver to this session.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Gateway intent flags
    ///
    /// Serialized as a plain integer in the Identify payload.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u64 {
        /// Guild create/update/delete, channel events
        const GUILDS                  = 1 << 0;
        /// Member join/update/leave (privileged)
        const GUILD_MEMBERS           = 1 << 1;
        /// Presence updates (privileged)
        const GUILD_PRESENCES         = 1 << 8;
        /// Message create/update/delete in guild channels
        const GUILD_MESSAGES          = 1 << 9;
        /// Reactions on guild messages
        const GUILD_MESSAGE_REACTIONS = 1 << 10;
        /// Direct messages
        const DIRECT_MESSAGES         = 1 << 12;
        /// Message content in events (privileged)
        const MESSAGE_CONTENT         = 1 << 15;

        /// What a chat relay needs: guild messages only
        const RELAY = Self::GUILD_MESSAGES.bits();
    }
}

impl Default for Intents {
    fn default() -> Self {
        Self::RELAY
    }
}

impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u64::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}
