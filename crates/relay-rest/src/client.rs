//! REST client
//!
//! The dispatcher talks to the API through [`RestClient`] so tests can swap
//! in a recording client. [`HttpRestClient`] is the real one.

use crate::error::{RestError, RestResult};
use crate::requests::OutboundRequest;
use async_trait::async_trait;
use relay_common::DiscordConfig;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;

/// Sends one outbound request and returns the response body
#[async_trait]
pub trait RestClient: Send + Sync {
    async fn execute(&self, request: &OutboundRequest) -> RestResult<String>;
}

/// HTTP client authenticated as a bot
#[derive(Clone)]
pub struct HttpRestClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl HttpRestClient {
    /// Create a client for `api_base` (no trailing slash needed)
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> RestResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("chat-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn from_config(config: &DiscordConfig) -> RestResult<Self> {
        Self::new(
            &config.api_base,
            &config.token,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    /// Absolute URL for a request path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

#[async_trait]
impl RestClient for HttpRestClient {
    async fn execute(&self, request: &OutboundRequest) -> RestResult<String> {
        let response = self
            .http
            .post(self.url(&request.path))
            .header(AUTHORIZATION, format!("Bot {}", self.token))
            .json(&request.body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

impl std::fmt::Debug for HttpRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRestClient")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}
