//! A single gateway connection
//!
//! Owns everything that lives exactly as long as one transport connection:
//! the outbound sender, the sequence counter, the heartbeat timer and the
//! close reason. The read loop and the heartbeat task share it through an `Arc`.

use super::session::{SessionConfig, StatusProvider};
use super::state::{CloseReason, SequenceTracker, SessionState};
use crate::error::{GatewayResult, TransportError};
use crate::events::{DispatchEvent, DispatchHandler, GatewayEventType, ReadyEvent};
use crate::heartbeat::HeartbeatScheduler;
use crate::protocol::{GatewayMessage, OpCode, PresencePayload};
use crate::transport::InboundFrame;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

pub(super) struct Connection {
    /// Identifies this connection in logs
    id: Uuid,

    config: Arc<SessionConfig>,

    /// Session-wide state, shared with `GatewaySession`
    state: Arc<watch::Sender<SessionState>>,

    handler: Arc<dyn DispatchHandler>,

    status_provider: StatusProvider,

    /// Taken (dropped) on close, which closes the transport
    outbound: Mutex<Option<mpsc::Sender<String>>>,

    sequence: SequenceTracker,

    /// Set once, from Hello
    heartbeat_interval: OnceLock<Duration>,

    heartbeat: Mutex<HeartbeatScheduler>,

    /// Whether the last heartbeat has been ACKed
    heartbeat_acked: AtomicBool,

    close_reason: Mutex<Option<CloseReason>>,
}

impl Connection {
    pub(super) fn new(
        config: Arc<SessionConfig>,
        state: Arc<watch::Sender<SessionState>>,
        handler: Arc<dyn DispatchHandler>,
        status_provider: StatusProvider,
        outbound: mpsc::Sender<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            config,
            state,
            handler,
            status_provider,
            outbound: Mutex::new(Some(outbound)),
            sequence: SequenceTracker::new(),
            heartbeat_interval: OnceLock::new(),
            heartbeat: Mutex::new(HeartbeatScheduler::new()),
            heartbeat_acked: AtomicBool::new(true),
            close_reason: Mutex::new(None),
        })
    }

    pub(super) fn id(&self) -> Uuid {
        self.id
    }

    pub(super) fn last_sequence(&self) -> Option<u64> {
        self.sequence.get()
    }

    pub(super) fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat_interval.get().copied()
    }

    pub(super) fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason.lock().clone()
    }

    /// Move to `state` unless the connection has already closed
    fn advance(&self, state: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == SessionState::Closed || *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    /// Enter `Closed`: stop the heartbeat and release the transport
    ///
    /// Only the first reason is kept.
    pub(super) fn finish(&self, reason: CloseReason) {
        {
            let mut slot = self.close_reason.lock();
            if slot.is_some() {
                return;
            }
            *slot = Some(reason.clone());
        }

        self.heartbeat.lock().stop();
        self.outbound.lock().take();
        self.state.send_replace(SessionState::Closed);

        tracing::info!(
            connection_id = %self.id,
            reason = %reason,
            "Gateway session closed"
        );
    }

    pub(super) fn stop_heartbeat(&self) {
        self.heartbeat.lock().stop();
    }

    // === Read loop ===

    /// Read frames until the transport ends or a frame closes the session
    pub(super) async fn run(self: Arc<Self>, mut inbound: mpsc::Receiver<InboundFrame>) {
        while let Some(frame) = inbound.recv().await {
            match frame {
                InboundFrame::Data(bytes) => {
                    if let Some(reason) = self.handle_frame(&bytes).await {
                        self.finish(reason);
                        return;
                    }
                }
                InboundFrame::Closed { code, reason } => {
                    tracing::info!(
                        connection_id = %self.id,
                        code = ?code,
                        reason = %reason,
                        "Gateway transport closed"
                    );
                    self.finish(CloseReason::TransportClosed { code, reason });
                    return;
                }
            }
        }

        self.finish(CloseReason::TransportClosed {
            code: None,
            reason: "end of stream".to_string(),
        });
    }

    /// Handle one data frame; returns a reason when the frame ends the session
    async fn handle_frame(self: &Arc<Self>, bytes: &[u8]) -> Option<CloseReason> {
        let message = match GatewayMessage::decode(bytes) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(
                    connection_id = %self.id,
                    error = %e,
                    frame = %String::from_utf8_lossy(bytes),
                    "Dropping undecodable gateway frame"
                );
                return None;
            }
        };

        tracing::trace!(
            connection_id = %self.id,
            op = %message.op,
            seq = ?message.s,
            event_type = ?message.t,
            "Received message"
        );

        match message.op {
            OpCode::Hello => {
                self.handle_hello(&message).await;
                None
            }
            OpCode::Dispatch => {
                self.handle_dispatch(message);
                None
            }
            OpCode::Heartbeat => {
                // Server wants a beat right now
                self.send_heartbeat().await;
                None
            }
            OpCode::HeartbeatAck => {
                self.heartbeat_acked.store(true, Ordering::SeqCst);
                None
            }
            OpCode::Reconnect => Some(CloseReason::ReconnectRequested),
            OpCode::InvalidSession => Some(CloseReason::InvalidSession {
                resumable: message.d.as_bool().unwrap_or(false),
            }),
            op => {
                tracing::debug!(connection_id = %self.id, op = %op, "Ignoring op code");
                None
            }
        }
    }

    async fn handle_hello(self: &Arc<Self>, message: &GatewayMessage) {
        let Some(hello) = message.as_hello() else {
            tracing::warn!(
                connection_id = %self.id,
                d = %message.d,
                "Hello without a usable heartbeat_interval"
            );
            return;
        };

        let period = Duration::from_millis(hello.heartbeat_interval);
        if self.heartbeat_interval.set(period).is_err() {
            tracing::warn!(connection_id = %self.id, "Duplicate Hello ignored");
            return;
        }

        self.advance(SessionState::Identifying);

        let weak = Arc::downgrade(self);
        let started = self.heartbeat.lock().start(period, move || {
            let weak = weak.clone();
            async move {
                if let Some(connection) = weak.upgrade() {
                    connection.scheduled_heartbeat().await;
                }
            }
        });
        if let Err(e) = started {
            tracing::error!(connection_id = %self.id, error = %e, "Failed to start heartbeat");
        }

        match self.send_identify().await {
            Ok(()) => {
                self.advance(SessionState::Ready);
                tracing::info!(
                    connection_id = %self.id,
                    heartbeat_interval_ms = hello.heartbeat_interval,
                    intents = self.config.intents.bits(),
                    "Identify sent"
                );
            }
            Err(e) => {
                tracing::warn!(connection_id = %self.id, error = %e, "Failed to send Identify");
            }
        }
    }

    fn handle_dispatch(&self, message: GatewayMessage) {
        if let Some(seq) = message.s {
            self.sequence.observe(seq);
        }

        let event = DispatchEvent {
            event_type: message.t.unwrap_or_default(),
            sequence: message.s,
            data: message.d,
        };

        if event.kind() == Some(GatewayEventType::Ready) {
            match serde_json::from_value::<ReadyEvent>(event.data.clone()) {
                Ok(ready) => tracing::info!(
                    connection_id = %self.id,
                    username = %ready.user.username,
                    session_id = %ready.session_id,
                    "Gateway ready"
                ),
                Err(e) => tracing::debug!(connection_id = %self.id, error = %e, "Unreadable READY"),
            }
        }

        self.handler.handle_dispatch(&event);
    }

    // === Outbound ===

    async fn send(&self, message: &GatewayMessage) -> GatewayResult<()> {
        let text = message.encode()?;
        let sender = self.outbound.lock().clone().ok_or(TransportError::Closed)?;
        sender
            .send(text)
            .await
            .map_err(|_| TransportError::Closed)?;
        Ok(())
    }

    fn presence(&self) -> PresencePayload {
        PresencePayload::online((self.status_provider)())
    }

    async fn send_identify(&self) -> GatewayResult<()> {
        let payload = self.config.identify_payload(self.presence());
        self.send(&GatewayMessage::identify(&payload)?).await
    }

    pub(super) async fn send_status_update(&self) -> GatewayResult<()> {
        self.send(&GatewayMessage::status_update(&self.presence())?).await
    }

    async fn scheduled_heartbeat(&self) {
        if !self.heartbeat_acked.swap(false, Ordering::SeqCst) {
            tracing::warn!(
                connection_id = %self.id,
                "Previous heartbeat was not acknowledged"
            );
        }
        self.send_heartbeat().await;
    }

    async fn send_heartbeat(&self) {
        let seq = self.sequence.get();
        match self.send(&GatewayMessage::heartbeat(seq)).await {
            Ok(()) => tracing::trace!(connection_id = %self.id, seq = ?seq, "Heartbeat sent"),
            Err(e) => tracing::debug!(connection_id = %self.id, error = %e, "Failed to send heartbeat"),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("sequence", &self.sequence.get())
            .field("heartbeat_interval", &self.heartbeat_interval.get())
            .finish()
    }
}
