//! Outbound dispatcher
//!
//! Queues API calls from any task and sends them one at a time, in order,
//! from a single worker.

use crate::client::RestClient;
use crate::requests::{ApiMessage, OutboundRequest};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

struct Shared {
    queue: Mutex<VecDeque<OutboundRequest>>,
    /// Stores a permit when nobody is waiting, so a wake is never lost
    wake: Notify,
    terminating: AtomicBool,
    client: Arc<dyn RestClient>,
}

/// Single-worker FIFO for outbound API calls
///
/// At most one request is in flight at a time. A failed request is logged
/// and skipped; it never stops the worker and is never retried. After
/// [`stop`](Self::stop), queued requests are discarded and new ones are
/// dropped with a warning.
pub struct OutboundDispatcher {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl OutboundDispatcher {
    pub fn new(client: Arc<dyn RestClient>) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::new()),
                wake: Notify::new(),
                terminating: AtomicBool::new(false),
                client,
            }),
            worker: Mutex::new(None),
        }
    }

    /// Spawn the worker
    pub fn start(&self) {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            tracing::warn!("Outbound dispatcher is already running");
            return;
        }
        if self.shared.terminating.load(Ordering::SeqCst) {
            tracing::warn!("Outbound dispatcher was stopped and cannot be restarted");
            return;
        }

        let shared = self.shared.clone();
        *worker = Some(tokio::spawn(run(shared)));

        tracing::info!("Outbound dispatcher started");
    }

    /// Append a request to the queue and wake the worker
    ///
    /// Never blocks. After `stop`, the request is dropped.
    pub fn enqueue(&self, request: OutboundRequest) {
        if self.shared.terminating.load(Ordering::SeqCst) {
            tracing::warn!(path = %request.path, "Dispatcher stopped, dropping request");
            return;
        }

        self.shared.queue.lock().push_back(request);
        self.shared.wake.notify_one();
    }

    /// Build and enqueue an API message
    pub fn send(&self, message: &impl ApiMessage) {
        self.enqueue(message.to_request());
    }

    /// Number of requests waiting to be sent
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Check if the worker is alive
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|w| !w.is_finished())
    }

    /// Signal the worker to exit
    ///
    /// A request already in flight is allowed to finish. Safe to call more
    /// than once, or before `start`.
    pub fn stop(&self) {
        if !self.shared.terminating.swap(true, Ordering::SeqCst) {
            tracing::info!("Outbound dispatcher stopping");
        }
        self.shared.wake.notify_one();
    }

    /// Stop and wait for the worker to exit
    pub async fn shutdown(&self) {
        self.stop();
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Outbound dispatcher worker failed");
            }
        }
    }
}

impl Drop for OutboundDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for OutboundDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundDispatcher")
            .field("pending", &self.pending())
            .field(
                "terminating",
                &self.shared.terminating.load(Ordering::SeqCst),
            )
            .finish()
    }
}

/// Worker loop
async fn run(shared: Arc<Shared>) {
    while !shared.terminating.load(Ordering::SeqCst) {
        let next = shared.queue.lock().pop_front();
        match next {
            Some(request) => process(&shared, request).await,
            None => shared.wake.notified().await,
        }
    }

    let dropped = {
        let mut queue = shared.queue.lock();
        let dropped = queue.len();
        queue.clear();
        dropped
    };
    if dropped > 0 {
        tracing::warn!(dropped = dropped, "Discarded unsent requests on shutdown");
    }

    tracing::info!("Outbound dispatcher stopped");
}

/// Send one request, logging the outcome
///
/// Runs the call on its own task and waits for it, so a panicking client
/// costs only that request.
async fn process(shared: &Shared, request: OutboundRequest) {
    let path = request.path.clone();
    let client = shared.client.clone();

    let outcome = tokio::spawn(async move { client.execute(&request).await }).await;

    match outcome {
        Ok(Ok(body)) => {
            tracing::debug!(path = %path, response = %body, "Request completed");
        }
        Ok(Err(e)) => {
            tracing::error!(path = %path, error = %e, "Request failed");
        }
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Request aborted");
        }
    }
}
