//! Session changes become `StateUpdated` broadcasts.
//!
//! Front-ends re-fetch the state when notified; the snapshot itself is not
//! broadcast.

use kw_01_session_store::{SessionStore, StateSubscription};
use shared_bus::MessageBus;
use shared_types::WalletBroadcast;
use tracing::debug;

/// Broadcast `StateUpdated` after every session change until the returned
/// subscription is dropped.
pub fn forward_state_updates(store: &SessionStore, bus: &MessageBus) -> StateSubscription {
    let bus = bus.clone();
    store.subscribe(move |state| {
        debug!(status = %state.status, accounts = state.accounts.len(), "Session changed");
        bus.broadcast(WalletBroadcast::StateUpdated);
    })
}
