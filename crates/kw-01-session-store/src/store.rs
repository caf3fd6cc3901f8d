//! # Session Store
//!
//! Owns the single `SessionState` of a runtime and performs its transitions.
//!
//! ```text
//!                 spawn_and_unlock
//! Uninitialized ─────────────────────┐
//!                                    ▼
//!          Locked ◄────── lock ──── Ready ◄─┐
//!            │                        │     │ unlock (re-authenticate)
//!            └──────── unlock ───────►└─────┘
//! ```
//!
//! The lock is never held across an `.await`. Vault I/O happens outside it
//! and results are applied afterwards, only if the same session is still
//! Ready.

use crate::domain::{ReadyHandle, ReadySession, SessionState};
use crate::ports::VaultProvider;
use keyward_telemetry::{metric_inc, SESSION_TRANSITIONS};
use parking_lot::RwLock;
use shared_types::{
    Account, Password, SecretString, Settings, WalletError, WalletResult, WalletState,
    WalletStatus,
};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

type StateListener = Arc<dyn Fn(&WalletState) + Send + Sync>;
type Listeners = RwLock<Vec<(u64, StateListener)>>;

/// Holds the session and notifies listeners after every change.
pub struct SessionStore {
    state: RwLock<SessionState>,
    vault: Arc<dyn VaultProvider>,
    listeners: Arc<Listeners>,
    next_listener: AtomicU64,
    generation: AtomicU64,
}

impl SessionStore {
    /// Create the store, starting Locked if the vault already exists.
    pub async fn load(vault: Arc<dyn VaultProvider>) -> WalletResult<Self> {
        let initial = if vault.exists().await? {
            SessionState::Locked
        } else {
            SessionState::Uninitialized
        };
        info!(status = %initial.status(), "Session store loaded");
        Ok(Self::with_state(vault, initial))
    }

    fn with_state(vault: Arc<dyn VaultProvider>, state: SessionState) -> Self {
        Self {
            state: RwLock::new(state),
            vault,
            listeners: Arc::new(RwLock::new(Vec::new())),
            next_listener: AtomicU64::new(1),
            generation: AtomicU64::new(0),
        }
    }

    /// Current state.
    #[must_use]
    pub fn get_state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> WalletStatus {
        self.state.read().status()
    }

    /// Front-end view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> WalletState {
        self.state.read().snapshot()
    }

    /// The vault capability.
    #[must_use]
    pub fn vault(&self) -> &Arc<dyn VaultProvider> {
        &self.vault
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Create a vault and unlock it. Valid only from Uninitialized.
    pub async fn spawn_and_unlock(
        &self,
        password: &Password,
        mnemonic: Option<&SecretString>,
    ) -> WalletResult<()> {
        if self.status().is_initialized() {
            return Err(WalletError::AlreadyInitialized);
        }
        self.vault.spawn(password, mnemonic).await?;
        info!("Vault created");
        self.open(password).await
    }

    /// Decrypt the vault and load the session.
    ///
    /// From Ready this re-authenticates and reloads. Vault failures leave the
    /// state unchanged.
    pub async fn unlock(&self, password: &Password) -> WalletResult<()> {
        if !self.status().is_initialized() {
            return Err(WalletError::NotInitialized);
        }
        self.open(password).await
    }

    async fn open(&self, password: &Password) -> WalletResult<()> {
        let vault = self.vault.setup(password).await?;
        let accounts = vault.fetch_accounts().await?;
        let settings = vault.fetch_settings().await?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let snapshot = {
            let mut state = self.state.write();
            *state = SessionState::Ready(ReadySession {
                vault,
                accounts,
                settings,
                generation,
            });
            state.snapshot()
        };

        metric_inc!(SESSION_TRANSITIONS, &["ready"]);
        info!(generation, accounts = snapshot.accounts.len(), "Session unlocked");
        self.notify(&snapshot);
        Ok(())
    }

    /// Close the session. Valid only from Ready.
    pub fn lock(&self) -> WalletResult<()> {
        let snapshot = {
            let mut state = self.state.write();
            if !matches!(*state, SessionState::Ready(_)) {
                return Err(WalletError::NotReady);
            }
            *state = SessionState::Locked;
            state.snapshot()
        };

        metric_inc!(SESSION_TRANSITIONS, &["locked"]);
        info!("Session locked");
        self.notify(&snapshot);
        Ok(())
    }

    // =========================================================================
    // GUARDS
    // =========================================================================

    /// Run `action` against the open vault. `NotReady` unless Ready.
    pub async fn with_ready<F, Fut, T>(&self, action: F) -> WalletResult<T>
    where
        F: FnOnce(ReadyHandle) -> Fut,
        Fut: Future<Output = WalletResult<T>>,
    {
        let handle = {
            let state = self.state.read();
            match state.ready() {
                Some(ready) => ready.handle(),
                None => return Err(WalletError::NotReady),
            }
        };
        action(handle).await
    }

    /// Run `action` if a vault exists. `NotInitialized` otherwise.
    pub async fn with_initialized<F, Fut, T>(&self, action: F) -> WalletResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = WalletResult<T>>,
    {
        if !self.status().is_initialized() {
            return Err(WalletError::NotInitialized);
        }
        action().await
    }

    // =========================================================================
    // UPDATES
    // =========================================================================

    /// Replace the account list of the session `handle` came from.
    ///
    /// Returns false (and changes nothing) if that session is gone.
    pub fn accounts_updated(&self, handle: &ReadyHandle, accounts: Vec<Account>) -> bool {
        self.update(handle, |ready| ready.accounts = accounts)
    }

    /// Replace the settings of the session `handle` came from.
    pub fn settings_updated(&self, handle: &ReadyHandle, settings: Settings) -> bool {
        self.update(handle, |ready| ready.settings = settings)
    }

    fn update(&self, handle: &ReadyHandle, apply: impl FnOnce(&mut ReadySession)) -> bool {
        let snapshot = {
            let mut state = self.state.write();
            match &mut *state {
                SessionState::Ready(ready) if ready.generation == handle.generation => {
                    apply(ready);
                }
                _ => {
                    warn!(
                        generation = handle.generation,
                        "Session changed during vault call, update not applied"
                    );
                    return false;
                }
            }
            state.snapshot()
        };
        self.notify(&snapshot);
        true
    }

    // =========================================================================
    // LISTENERS
    // =========================================================================

    /// Call `listener` with the new snapshot after every change.
    pub fn subscribe<F>(&self, listener: F) -> StateSubscription
    where
        F: Fn(&WalletState) + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().push((id, Arc::new(listener)));
        debug!(listener = id, "State listener added");
        StateSubscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    fn notify(&self, snapshot: &WalletState) {
        let listeners: Vec<StateListener> =
            self.listeners.read().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

/// Listener handle. The listener is removed on drop.
pub struct StateSubscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Drop for StateSubscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.write().retain(|(id, _)| *id != self.id);
        }
    }
}
