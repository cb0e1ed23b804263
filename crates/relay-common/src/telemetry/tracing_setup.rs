//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set. Otherwise the filter is built from the
//! configured level, with the WebSocket and HTTP stacks held at `warn` so
//! frame-level chatter does not drown out the relay's own events.

use crate::config::Environment;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Dependencies that log every frame or request at debug
const QUIET_TARGETS: [&str; 4] = ["tungstenite", "tokio_tungstenite", "hyper_util", "reqwest"];

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for the relay's own targets
    pub level: Level,
    /// One JSON object per line instead of human-readable text
    pub json: bool,
    /// Print the event target; chat lines and activity use their own targets
    pub targets: bool,
    pub file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            targets: true,
            file_line: false,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            file_line: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn production() -> Self {
        Self {
            json: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Staging => Self::default(),
            Environment::Production => Self::production(),
        }
    }

    /// Filter directives used when `RUST_LOG` is unset
    #[must_use]
    pub fn directives(&self) -> String {
        let level = self.level.to_string().to_lowercase();
        QUIET_TARGETS
            .iter()
            .fold(level, |acc, target| format!("{acc},{target}=warn"))
    }
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed, so calling twice is harmless.
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directives()));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(config.targets)
                    .with_file(config.file_line)
                    .with_line_number(config.file_line),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(config.targets)
                    .with_file(config.file_line)
                    .with_line_number(config.file_line),
            )
            .try_init()
    };

    result.map_err(|_| TracingError::AlreadyInitialized)
}

/// [`try_init_tracing_with_config`] with the default settings
pub fn try_init_tracing() -> Result<(), TracingError> {
    try_init_tracing_with_config(TracingConfig::default())
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
