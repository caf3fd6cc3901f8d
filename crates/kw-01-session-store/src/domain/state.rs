//! # Session State
//!
//! The one live session of a runtime. Account, settings and vault data exist
//! only inside [`SessionState::Ready`].

use crate::ports::UnlockedVault;
use shared_types::{Account, Settings, WalletState, WalletStatus};
use std::fmt;
use std::sync::Arc;

/// Data held while the session is unlocked.
#[derive(Clone)]
pub struct ReadySession {
    /// Opened vault.
    pub(crate) vault: Arc<dyn UnlockedVault>,
    /// Accounts as last reported by the vault.
    pub accounts: Vec<Account>,
    /// Settings as last reported by the vault.
    pub settings: Settings,
    /// Increments on every unlock, so results of work started under an
    /// earlier session are not applied to a later one.
    pub(crate) generation: u64,
}

impl ReadySession {
    /// Session generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Handle for work performed against this session.
    #[must_use]
    pub fn handle(&self) -> ReadyHandle {
        ReadyHandle {
            vault: self.vault.clone(),
            generation: self.generation,
        }
    }
}

impl fmt::Debug for ReadySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadySession")
            .field("accounts", &self.accounts.len())
            .field("settings", &self.settings.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Session lifecycle.
///
/// Created once at startup as `Uninitialized` or `Locked`, then only
/// transitioned. Never returns to `Uninitialized`.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// No vault exists.
    #[default]
    Uninitialized,
    /// A vault exists but is not open.
    Locked,
    /// The vault is open.
    Ready(ReadySession),
}

impl SessionState {
    /// Status of this state.
    #[must_use]
    pub fn status(&self) -> WalletStatus {
        match self {
            SessionState::Uninitialized => WalletStatus::Uninitialized,
            SessionState::Locked => WalletStatus::Locked,
            SessionState::Ready(_) => WalletStatus::Ready,
        }
    }

    /// Front-end view.
    #[must_use]
    pub fn snapshot(&self) -> WalletState {
        match self {
            SessionState::Ready(ready) => WalletState {
                status: WalletStatus::Ready,
                accounts: ready.accounts.clone(),
                settings: Some(ready.settings.clone()),
            },
            other => WalletState::without_session(other.status()),
        }
    }

    /// The ready session, if any.
    #[must_use]
    pub fn ready(&self) -> Option<&ReadySession> {
        match self {
            SessionState::Ready(ready) => Some(ready),
            _ => None,
        }
    }
}

/// What a guarded action gets to work with.
#[derive(Clone)]
pub struct ReadyHandle {
    /// Opened vault.
    pub vault: Arc<dyn UnlockedVault>,
    /// Generation of the session the handle came from.
    pub generation: u64,
}

impl fmt::Debug for ReadyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyHandle")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
