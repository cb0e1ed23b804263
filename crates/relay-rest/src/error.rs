//! REST error types

use relay_common::RelayError;
use thiserror::Error;

/// A single outbound call failed
#[derive(Debug, Error)]
pub enum RestError {
    /// Connect, timeout or body read failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

impl RestError {
    /// HTTP status, when the API answered at all
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// REST result type
pub type RestResult<T> = Result<T, RestError>;

impl From<RestError> for RelayError {
    fn from(err: RestError) -> Self {
        Self::Rest(err.to_string())
    }
}
