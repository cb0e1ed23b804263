//! Gateway close codes
//!
//! When the platform ends a session it puts one of these in the WebSocket
//! close frame. They tell the client what it did wrong, and whether trying
//! again can help.

/// Close codes in the 4000 range sent by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    UnknownError = 4000,
    UnknownOpcode = 4001,
    DecodeError = 4002,
    NotAuthenticated = 4003,
    AuthenticationFailed = 4004,
    AlreadyAuthenticated = 4005,
    InvalidSequence = 4007,
    RateLimited = 4008,
    SessionTimeout = 4009,
    InvalidShard = 4010,
    ShardingRequired = 4011,
    InvalidApiVersion = 4012,
    InvalidIntents = 4013,
    DisallowedIntents = 4014,
}

const ALL: [CloseCode; 14] = [
    CloseCode::UnknownError,
    CloseCode::UnknownOpcode,
    CloseCode::DecodeError,
    CloseCode::NotAuthenticated,
    CloseCode::AuthenticationFailed,
    CloseCode::AlreadyAuthenticated,
    CloseCode::InvalidSequence,
    CloseCode::RateLimited,
    CloseCode::SessionTimeout,
    CloseCode::InvalidShard,
    CloseCode::ShardingRequired,
    CloseCode::InvalidApiVersion,
    CloseCode::InvalidIntents,
    CloseCode::DisallowedIntents,
];

impl CloseCode {
    /// Look up a raw close frame code; `None` for anything outside the table
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        ALL.into_iter().find(|code| code.as_u16() == value)
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether a fresh session could succeed after this close
    ///
    /// Bad credentials, shard settings, API version or intents fail the same
    /// way on every attempt.
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        !matches!(
            self,
            Self::AuthenticationFailed
                | Self::InvalidShard
                | Self::ShardingRequired
                | Self::InvalidApiVersion
                | Self::InvalidIntents
                | Self::DisallowedIntents
        )
    }

    /// What the gateway is complaining about, from the client's side
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "gateway hit an error it could not name",
            Self::UnknownOpcode => "we sent an op code the gateway does not know",
            Self::DecodeError => "we sent a frame the gateway could not decode",
            Self::NotAuthenticated => "we sent a payload before Identify",
            Self::AuthenticationFailed => "bot token was rejected",
            Self::AlreadyAuthenticated => "we sent Identify more than once",
            Self::InvalidSequence => "resume sequence was not valid",
            Self::RateLimited => "we sent frames too quickly",
            Self::SessionTimeout => "session timed out",
            Self::InvalidShard => "shard settings are invalid",
            Self::ShardingRequired => "bot is in too many guilds to run unsharded",
            Self::InvalidApiVersion => "gateway version is invalid or retired",
            Self::InvalidIntents => "intents bitmask is invalid",
            Self::DisallowedIntents => "bot is not approved for a requested intent",
        }
    }
}

impl TryFrom<u16> for CloseCode {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_u16(value).ok_or(value)
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}: {}", self.as_u16(), self, self.description())
    }
}
