//! Application error types
//!
//! Top-level error for the relay process. Component crates keep their own
//! error enums and convert into this one at the application boundary.

use crate::config::ConfigError;
use crate::telemetry::TracingError;

/// Relay-wide error type
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TracingError),

    /// Gateway session or transport failure
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Outbound REST failure
    #[error("REST error: {0}")]
    Rest(String),

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl RelayError {
    /// Short machine-readable code for log fields
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Telemetry(_) => "TELEMETRY_ERROR",
            Self::Gateway(_) => "GATEWAY_ERROR",
            Self::Rest(_) => "REST_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;
