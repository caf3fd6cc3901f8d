//! Pending Request Store.
//!
//! Maps message ids to callers awaiting a response. Responses are matched
//! strictly by id, so they may complete in any order.

use dashmap::DashMap;
use keyward_telemetry::{metric_inc, BUS_REQUESTS};
use shared_types::{MessageId, WalletError, WalletResponse};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

/// What a handler replies with.
pub type BusReply = Result<WalletResponse, WalletError>;

/// A request waiting for its response.
struct PendingRequest {
    /// Channel to send the response
    sender: oneshot::Sender<BusReply>,
    /// When the request was registered
    created_at: Instant,
    /// Request type (for logging)
    request_type: &'static str,
}

/// Statistics for the pending request store
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered
    pub total_registered: AtomicU64,
    /// Total requests completed
    pub total_completed: AtomicU64,
    /// Total requests that timed out
    pub total_timeouts: AtomicU64,
    /// Total requests cancelled (caller gone)
    pub total_cancelled: AtomicU64,
    /// Responses for ids that were not pending
    pub total_unmatched: AtomicU64,
}

/// Pending request store.
///
/// Flow:
/// 1. `register()` creates a `MessageId` and a oneshot receiver
/// 2. The request is dispatched to handlers carrying that id
/// 3. Whoever answers calls `complete()` with the id
/// 4. The caller awaits the receiver or times out and calls `expire()`
pub struct PendingRequestStore {
    pending: DashMap<MessageId, PendingRequest>,
    stats: Arc<PendingStats>,
}

impl PendingRequestStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a pending request and get a receiver for the response.
    pub fn register(&self, request_type: &'static str) -> (MessageId, oneshot::Receiver<BusReply>) {
        let id = MessageId::new();
        let (tx, rx) = oneshot::channel();

        self.pending.insert(
            id,
            PendingRequest {
                sender: tx,
                created_at: Instant::now(),
                request_type,
            },
        );
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(id = %id, request_type, "Registered pending request");

        (id, rx)
    }

    /// Complete a pending request with a response.
    ///
    /// Returns false if the id is unknown, already completed or expired.
    pub fn complete(&self, id: MessageId, reply: BusReply) -> bool {
        let Some((_, pending)) = self.pending.remove(&id) else {
            self.stats.total_unmatched.fetch_add(1, Ordering::Relaxed);
            warn!(id = %id, "Response for unknown or expired request id, dropped");
            return false;
        };

        let elapsed = pending.created_at.elapsed();
        match pending.sender.send(reply) {
            Ok(()) => {
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                metric_inc!(BUS_REQUESTS, &["completed"]);
                debug!(
                    id = %id,
                    request_type = pending.request_type,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Completed pending request"
                );
                true
            }
            Err(_) => {
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                metric_inc!(BUS_REQUESTS, &["cancelled"]);
                debug!(
                    id = %id,
                    request_type = pending.request_type,
                    "Pending request receiver dropped"
                );
                false
            }
        }
    }

    /// Drop a request whose caller stopped waiting.
    pub fn expire(&self, id: &MessageId) -> bool {
        let Some((_, pending)) = self.pending.remove(id) else {
            return false;
        };
        self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
        metric_inc!(BUS_REQUESTS, &["timeout"]);
        warn!(
            id = %id,
            request_type = pending.request_type,
            elapsed_ms = pending.created_at.elapsed().as_millis() as u64,
            "Request timed out"
        );
        true
    }

    /// Cancel a pending request
    pub fn cancel(&self, id: &MessageId) -> bool {
        if self.pending.remove(id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Number of requests currently awaiting a response
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether an id is awaiting a response
    pub fn is_pending(&self, id: &MessageId) -> bool {
        self.pending.contains_key(id)
    }

    /// Statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

impl Default for PendingRequestStore {
    fn default() -> Self {
        Self::new()
    }
}
