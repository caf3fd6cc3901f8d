//! # Broadcast Subscriptions
//!
//! Defines the receiving side of broadcasts.

use crate::bus::BusInner;
use shared_types::WalletBroadcast;
use std::sync::Weak;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("Message bus closed")]
    Closed,
}

/// A subscription handle.
///
/// When dropped, the handler is removed and receives nothing further.
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub(crate) fn new(id: u64, bus: Weak<BusInner>) -> Self {
        Self { id, bus }
    }

    /// Remove the handler now.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            if bus.remove_subscriber(self.id) {
                debug!(subscriber = self.id, "Subscription dropped");
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// A subscription that queues broadcasts for an async consumer.
pub struct BroadcastReceiver {
    receiver: mpsc::UnboundedReceiver<WalletBroadcast>,
    _subscription: Subscription,
}

impl BroadcastReceiver {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<WalletBroadcast>,
        subscription: Subscription,
    ) -> Self {
        Self {
            receiver,
            _subscription: subscription,
        }
    }

    /// Receive the next broadcast.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next broadcast
    /// - `None` - The bus was dropped
    pub async fn recv(&mut self) -> Option<WalletBroadcast> {
        self.receiver.recv().await
    }

    /// Try to receive the next broadcast without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A broadcast was queued
    /// - `Ok(None)` - Nothing queued
    /// - `Err(SubscriptionError::Closed)` - The bus was dropped
    pub fn try_recv(&mut self) -> Result<Option<WalletBroadcast>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    /// Drain everything queued so far.
    pub fn drain(&mut self) -> Vec<WalletBroadcast> {
        let mut out = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            out.push(message);
        }
        out
    }
}
