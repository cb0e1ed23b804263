//! Dispatch event names the relay acts on
//!
//! Everything else that arrives in `t` is passed through as a plain string.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEventType {
    /// First dispatch after Identify
    Ready,
    Resumed,
    GuildCreate,
    MessageCreate,
}

const WIRE_NAMES: [(GatewayEventType, &str); 4] = [
    (GatewayEventType::Ready, "READY"),
    (GatewayEventType::Resumed, "RESUMED"),
    (GatewayEventType::GuildCreate, "GUILD_CREATE"),
    (GatewayEventType::MessageCreate, "MESSAGE_CREATE"),
];

impl GatewayEventType {
    /// Name as it appears in `t`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        WIRE_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or("", |(_, name)| name)
    }
}

impl FromStr for GatewayEventType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WIRE_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(kind, _)| *kind)
            .ok_or(())
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
