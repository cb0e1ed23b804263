//! # relay-common
//!
//! Shared utilities for the chat relay: configuration, error handling and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{AppSettings, ConfigError, DiscordConfig, Environment, RelayConfig, RelaySettings};
pub use error::{RelayError, RelayResult};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
