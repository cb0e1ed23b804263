//! Presence status text

use parking_lot::RwLock;
use relay_gateway::StatusProvider;
use std::sync::Arc;

/// Shared, updatable status text
///
/// The gateway session reads it through [`provider`](Self::provider) every
/// time it builds a presence payload.
#[derive(Debug, Clone, Default)]
pub struct StatusText {
    inner: Arc<RwLock<String>>,
}

impl StatusText {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(text.into())),
        }
    }

    pub fn get(&self) -> String {
        self.inner.read().clone()
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.inner.write() = text.into();
    }

    /// Provider closure for `GatewaySession`
    pub fn provider(&self) -> StatusProvider {
        let inner = self.inner.clone();
        Arc::new(move || inner.read().clone())
    }
}
