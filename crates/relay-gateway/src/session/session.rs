//! Gateway session handle

use super::connection::Connection;
use super::state::{CloseReason, SessionState};
use crate::error::{GatewayError, GatewayResult};
use crate::events::DispatchHandler;
use crate::protocol::{IdentifyPayload, IdentifyProperties, Intents, PresencePayload};
use crate::transport::GatewayTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Supplies the presence activity text, read fresh for every Identify and status update
pub type StatusProvider = Arc<dyn Fn() -> String + Send + Sync>;

/// Static session parameters
#[derive(Clone)]
pub struct SessionConfig {
    /// Bot token sent in Identify
    pub token: String,
    /// Gateway WebSocket URL
    pub gateway_url: String,
    /// Requested event categories
    pub intents: Intents,
    /// Client properties sent in Identify
    pub properties: IdentifyProperties,
}

impl SessionConfig {
    #[must_use]
    pub fn new(token: impl Into<String>, gateway_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            gateway_url: gateway_url.into(),
            intents: Intents::RELAY,
            properties: IdentifyProperties::relay(),
        }
    }

    #[must_use]
    pub fn with_intents(mut self, intents: Intents) -> Self {
        self.intents = intents;
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: IdentifyProperties) -> Self {
        self.properties = properties;
        self
    }

    pub(crate) fn identify_payload(&self, presence: PresencePayload) -> IdentifyPayload {
        IdentifyPayload {
            token: self.token.clone(),
            intents: self.intents,
            properties: self.properties.clone(),
            presence,
        }
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("token", &"<redacted>")
            .field("gateway_url", &self.gateway_url)
            .field("intents", &self.intents)
            .field("properties", &self.properties)
            .finish()
    }
}

struct ActiveConnection {
    connection: Arc<Connection>,
    /// Taken once awaited
    read_task: Option<JoinHandle<()>>,
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        if let Some(task) = &self.read_task {
            task.abort();
        }
        self.connection.stop_heartbeat();
    }
}

/// Client session against the gateway
///
/// Drives one connection at a time through
/// `Disconnected -> AwaitingHello -> Identifying -> Ready -> Closed`.
/// After `Closed`, `connect` starts over with a fresh sequence and heartbeat.
/// Dispatch events are handed to the [`DispatchHandler`] on the read loop,
/// in the order they arrived.
pub struct GatewaySession {
    config: Arc<SessionConfig>,
    transport: Arc<dyn GatewayTransport>,
    handler: Arc<dyn DispatchHandler>,
    status_provider: StatusProvider,
    state: Arc<watch::Sender<SessionState>>,
    active: Option<ActiveConnection>,
}

impl GatewaySession {
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn GatewayTransport>,
        handler: Arc<dyn DispatchHandler>,
        status_provider: StatusProvider,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Disconnected);
        Self {
            config: Arc::new(config),
            transport,
            handler,
            status_provider,
            state: Arc::new(state),
            active: None,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Highest dispatch sequence seen on the current connection
    pub fn last_sequence(&self) -> Option<u64> {
        self.active.as_ref()?.connection.last_sequence()
    }

    /// Heartbeat interval announced by the server's Hello
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.active.as_ref()?.connection.heartbeat_interval()
    }

    /// Why the current connection closed, if it has
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.active.as_ref()?.connection.close_reason()
    }

    /// Open a connection and start reading
    ///
    /// Returns once the transport is open; the handshake continues on the
    /// read loop. Fails if a connection is already live.
    pub async fn connect(&mut self) -> GatewayResult<()> {
        let current = self.state();
        if current.is_live() {
            return Err(GatewayError::InvalidState(current));
        }

        // Release whatever is left of the previous connection first
        self.active = None;

        let channels = match self.transport.connect(&self.config.gateway_url).await {
            Ok(channels) => channels,
            Err(e) => {
                tracing::warn!(url = %self.config.gateway_url, error = %e, "Gateway connect failed");
                self.state.send_replace(SessionState::Closed);
                return Err(e.into());
            }
        };

        let connection = Connection::new(
            self.config.clone(),
            self.state.clone(),
            self.handler.clone(),
            self.status_provider.clone(),
            channels.outbound,
        );

        // Before spawning, so the read loop can never be overtaken
        self.state.send_replace(SessionState::AwaitingHello);

        tracing::info!(
            connection_id = %connection.id(),
            url = %self.config.gateway_url,
            "Gateway connected, awaiting Hello"
        );

        let read_task = tokio::spawn(connection.clone().run(channels.inbound));
        self.active = Some(ActiveConnection {
            connection,
            read_task: Some(read_task),
        });

        Ok(())
    }

    /// Send a presence update (op 3) with the current status text
    pub async fn update_status(&self) -> GatewayResult<()> {
        let active = self.active.as_ref().ok_or(GatewayError::NotConnected)?;
        if !self.state().is_live() {
            return Err(GatewayError::NotConnected);
        }
        active.connection.send_status_update().await
    }

    /// Close the connection
    ///
    /// Stops the heartbeat and the read loop. A no-op when nothing is open.
    pub async fn close(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        active.connection.finish(CloseReason::Requested);
        if let Some(task) = active.read_task.take() {
            task.abort();
            let _ = task.await;
        }
    }

    /// Wait until the current connection closes
    ///
    /// Returns `None` if `connect` has never succeeded.
    pub async fn wait_closed(&self) -> Option<CloseReason> {
        let connection = self.active.as_ref()?.connection.clone();
        let mut state = self.state.subscribe();
        let _ = state.wait_for(|s| *s == SessionState::Closed).await;
        connection.close_reason()
    }
}

impl std::fmt::Debug for GatewaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySession")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("connection", &self.active.as_ref().map(|a| &a.connection))
            .finish()
    }
}
