//! # Message Bus
//!
//! In-process request/response and broadcast bus.
//!
//! - `request` awaits exactly one response correlated by a fresh id.
//! - `broadcast` calls every handler subscribed at the time of the call, in
//!   subscription order.

use crate::config::BusConfig;
use crate::error::BusError;
use crate::handler::{RequestHandler, RequestRegistration};
use crate::pending::{BusReply, PendingRequestStore};
use crate::subscriber::{BroadcastReceiver, Subscription};
use keyward_telemetry::{metric_inc, BUS_BROADCASTS};
use parking_lot::RwLock;
use shared_types::{MessageId, WalletBroadcast, WalletRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

type BroadcastHandler = Arc<dyn Fn(&WalletBroadcast) + Send + Sync>;

pub(crate) struct BusInner {
    config: BusConfig,
    pending: PendingRequestStore,
    handlers: RwLock<Vec<(u64, Arc<dyn RequestHandler>)>>,
    subscribers: RwLock<Vec<(u64, BroadcastHandler)>>,
    next_id: AtomicU64,
    broadcasts_sent: AtomicU64,
}

impl BusInner {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn has_handler(&self, id: u64) -> bool {
        self.handlers.read().iter().any(|(h, _)| *h == id)
    }

    pub(crate) fn remove_handler(&self, id: u64) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != id);
        handlers.len() != before
    }

    pub(crate) fn remove_subscriber(&self, id: u64) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(s, _)| *s != id);
        subscribers.len() != before
    }

    async fn dispatch(&self, id: MessageId, request: WalletRequest) {
        // Snapshot so handlers may register or unregister while running.
        let handlers: Vec<Arc<dyn RequestHandler>> =
            self.handlers.read().iter().map(|(_, h)| h.clone()).collect();

        for handler in handlers {
            if let Some(reply) = handler.handle(id, &request).await {
                self.pending.complete(id, reply);
                return;
            }
        }

        debug!(
            id = %id,
            request_type = request.type_name(),
            "No handler claimed request, awaiting deferred response"
        );
    }
}

/// The message bus. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<BusInner>,
}

impl MessageBus {
    /// Create a bus with the given configuration.
    #[must_use]
    pub fn new(config: BusConfig) -> Self {
        Self {
            inner: Arc::new(BusInner {
                config,
                pending: PendingRequestStore::new(),
                handlers: RwLock::new(Vec::new()),
                subscribers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
                broadcasts_sent: AtomicU64::new(0),
            }),
        }
    }

    /// Send a request and wait for its response.
    ///
    /// The outer `Result` is the transport; the inner one is the handler's
    /// answer. Must be called from within a tokio runtime.
    pub async fn request(&self, request: WalletRequest) -> Result<BusReply, BusError> {
        let (id, rx) = self.inner.pending.register(request.type_name());
        debug!(id = %id, request_type = request.type_name(), "Request sent");

        let inner = self.inner.clone();
        tokio::spawn(async move { inner.dispatch(id, request).await });

        let timeout = self.inner.config.request_timeout;
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(BusError::Cancelled(id)),
            Err(_) => {
                self.inner.pending.expire(&id);
                Err(BusError::Timeout { id, timeout })
            }
        }
    }

    /// Answer a request that a handler deferred.
    ///
    /// Returns false if the id is not pending; the response is dropped.
    pub fn respond(&self, id: MessageId, reply: BusReply) -> bool {
        self.inner.pending.complete(id, reply)
    }

    /// Register a request handler.
    pub fn on_request(&self, handler: Arc<dyn RequestHandler>) -> RequestRegistration {
        let id = self.inner.next_id();
        self.inner.handlers.write().push((id, handler));
        debug!(handler = id, "Request handler registered");
        RequestRegistration::new(id, Arc::downgrade(&self.inner))
    }

    /// Subscribe a broadcast handler.
    ///
    /// The handler runs synchronously inside `broadcast`; it must not block.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&WalletBroadcast) + Send + Sync + 'static,
    {
        let id = self.inner.next_id();
        self.inner.subscribers.write().push((id, Arc::new(handler)));
        debug!(subscriber = id, "New subscription created");
        Subscription::new(id, Arc::downgrade(&self.inner))
    }

    /// Subscribe with a queue instead of a callback.
    pub fn subscribe_channel(&self) -> BroadcastReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(move |message| {
            // Receiver gone means the subscription is being dropped.
            let _ = tx.send(message.clone());
        });
        BroadcastReceiver::new(rx, subscription)
    }

    /// Deliver a message to every current subscriber.
    ///
    /// Returns the number of subscribers called.
    pub fn broadcast(&self, message: WalletBroadcast) -> usize {
        let subscribers: Vec<BroadcastHandler> = self
            .inner
            .subscribers
            .read()
            .iter()
            .map(|(_, s)| s.clone())
            .collect();

        self.inner.broadcasts_sent.fetch_add(1, Ordering::Relaxed);
        metric_inc!(BUS_BROADCASTS);

        if subscribers.is_empty() {
            warn!(message = ?message, "Broadcast dropped (no subscribers)");
            return 0;
        }

        for subscriber in &subscribers {
            subscriber(&message);
        }

        debug!(message = ?message, receivers = subscribers.len(), "Broadcast delivered");
        subscribers.len()
    }

    /// Number of broadcast subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    /// Number of registered request handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner.handlers.read().len()
    }

    /// Number of requests awaiting a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.pending_count()
    }

    /// Total broadcasts sent.
    #[must_use]
    pub fn broadcasts_sent(&self) -> u64 {
        self.inner.broadcasts_sent.load(Ordering::Relaxed)
    }

    /// Request statistics.
    pub fn stats(&self) -> &crate::pending::PendingStats {
        self.inner.pending.stats()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}
