//! Heartbeat scheduling
//!
//! Runs a callback on a fixed period in its own task, so beats keep their
//! cadence no matter what the read loop is doing.

use crate::error::{GatewayError, GatewayResult};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// A cancellable fixed-period timer
///
/// The first callback fires one full period after `start`, never immediately.
/// Dropping the scheduler stops it.
#[derive(Debug, Default)]
pub struct HeartbeatScheduler {
    task: Option<JoinHandle<()>>,
    period: Option<Duration>,
}

impl HeartbeatScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start firing `callback` every `period`
    ///
    /// Only one timer may be active; starting twice without `stop` is an error.
    pub fn start<F, Fut>(&mut self, period: Duration, mut callback: F) -> GatewayResult<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_running() {
            return Err(GatewayError::HeartbeatAlreadyRunning);
        }

        // A zero period would make tokio's interval panic
        let period = period.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            // After a stall, resume the schedule rather than firing a burst of beats
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                callback().await;
            }
        });

        self.task = Some(task);
        self.period = Some(period);

        tracing::debug!(interval_ms = period.as_millis(), "Heartbeat started");
        Ok(())
    }

    /// Stop the timer; a no-op when not running
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Heartbeat stopped");
        }
        self.period = None;
    }

    /// Check whether a timer is active
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Period of the active timer
    #[must_use]
    pub fn period(&self) -> Option<Duration> {
        self.period
    }
}

impl Drop for HeartbeatScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
