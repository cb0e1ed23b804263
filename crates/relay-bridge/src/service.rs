//! Relay service
//!
//! Keeps a gateway session open: connect, wait for it to close, decide
//! whether to reconnect, repeat. Driven from outside through a [`RelayHandle`].

use crate::status::StatusText;
use rand::Rng;
use relay_common::{RelayError, RelayResult, RelaySettings};
use relay_gateway::{CloseReason, GatewaySession};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// When and how soon to open a new session after one closes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub delay: Duration,
}

impl ReconnectPolicy {
    #[must_use]
    pub fn from_settings(settings: &RelaySettings) -> Self {
        Self {
            enabled: settings.reconnect,
            delay: Duration::from_millis(settings.reconnect_delay_ms),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            delay: Duration::ZERO,
        }
    }

    /// Delay before the next attempt, with up to 25% random jitter
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        let max_jitter = self.delay.as_millis() as u64 / 4;
        if max_jitter == 0 {
            return self.delay;
        }
        let jitter = rand::thread_rng().gen_range(0..=max_jitter);
        self.delay + Duration::from_millis(jitter)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: Duration::from_millis(5000),
        }
    }
}

#[derive(Debug)]
enum Command {
    UpdateStatus,
}

/// Controls a running [`RelayService`]
#[derive(Debug, Clone)]
pub struct RelayHandle {
    commands: mpsc::UnboundedSender<Command>,
    shutdown: Arc<watch::Sender<bool>>,
    status: StatusText,
}

impl RelayHandle {
    /// Change the status text and push it to the live session
    ///
    /// When no session is live, the new text goes out with the next Identify.
    pub fn update_status(&self, text: impl Into<String>) {
        self.status.set(text);
        let _ = self.commands.send(Command::UpdateStatus);
    }

    /// Close the session and stop reconnecting
    ///
    /// Dropping every handle has the same effect.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn status(&self) -> String {
        self.status.get()
    }
}

enum Wake {
    Closed(Option<CloseReason>),
    Command(Command),
    Shutdown,
}

/// Reconnecting owner of the gateway session
pub struct RelayService {
    session: GatewaySession,
    policy: ReconnectPolicy,
    commands: mpsc::UnboundedReceiver<Command>,
    shutdown: watch::Receiver<bool>,
}

impl RelayService {
    /// `status` must be the same text the session's status provider reads
    pub fn new(
        session: GatewaySession,
        policy: ReconnectPolicy,
        status: StatusText,
    ) -> (Self, RelayHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown) = watch::channel(false);

        let service = Self {
            session,
            policy,
            commands,
            shutdown,
        };
        let handle = RelayHandle {
            commands: commands_tx,
            shutdown: Arc::new(shutdown_tx),
            status,
        };
        (service, handle)
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Run until shutdown, or until a close that must not be retried
    pub async fn run(mut self) -> RelayResult<()> {
        tracing::info!(
            reconnect = self.policy.enabled,
            delay_ms = self.policy.delay.as_millis() as u64,
            "Relay service started"
        );

        let mut attempt: u32 = 0;
        loop {
            if self.shutdown_requested() {
                break;
            }

            attempt += 1;
            let reason = match self.session.connect().await {
                Ok(()) => {
                    tracing::info!(attempt = attempt, "Gateway session opened");
                    match self.serve().await {
                        Some(reason) => Some(reason),
                        None => break,
                    }
                }
                Err(e) => {
                    tracing::error!(attempt = attempt, error = %e, "Failed to open gateway session");
                    if !self.policy.enabled {
                        return Err(e.into());
                    }
                    None
                }
            };

            if let Some(reason) = &reason {
                if !reason.should_reconnect() {
                    tracing::error!(reason = %reason, "Gateway closed for good, not reconnecting");
                    return Err(RelayError::Gateway(format!("session closed: {reason}")));
                }
                if !self.policy.enabled {
                    tracing::info!(reason = %reason, "Gateway closed, reconnect disabled");
                    break;
                }
            }

            let delay = self.policy.next_delay();
            tracing::info!(delay_ms = delay.as_millis() as u64, "Reconnecting after delay");
            if self.sleep_or_shutdown(delay).await {
                break;
            }
        }

        self.session.close().await;
        tracing::info!("Relay service stopped");
        Ok(())
    }

    /// Serve one live session; `None` means shutdown was requested
    async fn serve(&mut self) -> Option<CloseReason> {
        loop {
            let wake = tokio::select! {
                reason = self.session.wait_closed() => Wake::Closed(reason),
                Some(command) = self.commands.recv() => Wake::Command(command),
                () = shutdown_signal(&mut self.shutdown) => Wake::Shutdown,
            };

            match wake {
                Wake::Closed(reason) => {
                    let reason = reason.unwrap_or(CloseReason::TransportClosed {
                        code: None,
                        reason: "never connected".to_string(),
                    });
                    tracing::warn!(reason = %reason, "Gateway session closed");
                    return Some(reason);
                }
                Wake::Command(Command::UpdateStatus) => {
                    if let Err(e) = self.session.update_status().await {
                        tracing::warn!(error = %e, "Failed to update status");
                    }
                }
                Wake::Shutdown => {
                    self.session.close().await;
                    return None;
                }
            }
        }
    }

    /// Returns true if shutdown was requested while waiting
    async fn sleep_or_shutdown(&mut self, delay: Duration) -> bool {
        let interrupted = tokio::select! {
            () = tokio::time::sleep(delay) => false,
            () = shutdown_signal(&mut self.shutdown) => true,
        };
        interrupted || self.shutdown_requested()
    }
}

/// Resolves once shutdown is requested or every handle is gone
async fn shutdown_signal(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

impl std::fmt::Debug for RelayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayService")
            .field("session", &self.session)
            .field("policy", &self.policy)
            .finish()
    }
}
