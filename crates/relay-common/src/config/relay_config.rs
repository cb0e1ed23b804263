//! Relay configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub app: AppSettings,
    pub discord: DiscordConfig,
    pub relay: RelaySettings,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Chat platform connection settings
#[derive(Clone, Deserialize)]
pub struct DiscordConfig {
    /// Bot token, sent in Identify and as `Authorization: Bot <token>`
    pub token: String,
    /// Channel that game chat is relayed to
    pub channel_id: String,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Transport-level timeout for a single REST call
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

// Keep the token out of logs.
impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("gateway_url", &self.gateway_url)
            .field("api_base", &self.api_base)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Relay behaviour settings
#[derive(Debug, Clone, Deserialize)]
pub struct RelaySettings {
    /// Status text shown in the bot's presence at startup
    #[serde(default = "default_status")]
    pub status: String,
    /// Relay game chat as embeds instead of plain messages
    #[serde(default)]
    pub use_embeds: bool,
    /// Open a new session after the gateway closes
    #[serde(default = "default_reconnect")]
    pub reconnect: bool,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

// Default value functions
fn default_app_name() -> String {
    "chat-relay".to_string()
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".to_string()
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_status() -> String {
    "a game server".to_string()
}

fn default_reconnect() -> bool {
    true
}

fn default_reconnect_delay_ms() -> u64 {
    5000
}

impl RelayConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .as_deref()
                    .and_then(Environment::parse)
                    .unwrap_or_default(),
            },
            discord: DiscordConfig {
                token: required("RELAY_BOT_TOKEN")?,
                channel_id: required("RELAY_CHANNEL_ID")?,
                gateway_url: lookup("RELAY_GATEWAY_URL").unwrap_or_else(default_gateway_url),
                api_base: lookup("RELAY_API_BASE")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(default_api_base),
                http_timeout_secs: parse_var(&lookup, "RELAY_HTTP_TIMEOUT_SECS")?
                    .unwrap_or_else(default_http_timeout_secs),
            },
            relay: RelaySettings {
                status: lookup("RELAY_STATUS").unwrap_or_else(default_status),
                use_embeds: parse_var(&lookup, "RELAY_USE_EMBEDS")?.unwrap_or(false),
                reconnect: parse_var(&lookup, "RELAY_RECONNECT")?.unwrap_or_else(default_reconnect),
                reconnect_delay_ms: parse_var(&lookup, "RELAY_RECONNECT_DELAY_MS")?
                    .unwrap_or_else(default_reconnect_delay_ms),
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
