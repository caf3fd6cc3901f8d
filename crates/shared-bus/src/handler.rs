//! # Request Handlers
//!
//! The answering side of the bus. Handlers are tried in registration order
//! and the first one returning `Some` resolves the request.

use crate::bus::BusInner;
use crate::pending::BusReply;
use async_trait::async_trait;
use shared_types::{MessageId, WalletRequest};
use std::sync::Weak;
use tracing::debug;

/// Answers bus requests.
///
/// Return `None` for requests this handler does not own. A handler that
/// returns `None` may still answer later through `MessageBus::respond`.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handle one request.
    async fn handle(&self, id: MessageId, request: &WalletRequest) -> Option<BusReply>;
}

/// Handle for a registered request handler.
///
/// The handler is removed when this is dropped or `unregister` is called.
pub struct RequestRegistration {
    id: u64,
    bus: Weak<BusInner>,
}

impl RequestRegistration {
    pub(crate) fn new(id: u64, bus: Weak<BusInner>) -> Self {
        Self { id, bus }
    }

    /// Remove the handler now.
    pub fn unregister(self) {
        // Drop does the work.
    }

    /// Whether the handler is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.bus
            .upgrade()
            .map(|bus| bus.has_handler(self.id))
            .unwrap_or(false)
    }
}

impl Drop for RequestRegistration {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            if bus.remove_handler(self.id) {
                debug!(handler = self.id, "Request handler unregistered");
            }
        }
    }
}

impl std::fmt::Debug for RequestRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRegistration")
            .field("id", &self.id)
            .finish()
    }
}
