//! # Core Domain Entities
//!
//! Wallet-facing entities shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Session**: `WalletStatus`, `WalletState`
//! - **Accounts**: `Account`, `AccountType`, `PublicKeyHash`
//! - **Settings**: `Settings` (opaque key/value mapping)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CLUSTER A: SESSION
// =============================================================================

/// Lifecycle status of the wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletStatus {
    /// No vault exists yet.
    Uninitialized,
    /// A vault exists on disk but has not been decrypted.
    Locked,
    /// The vault is decrypted and the session is materialized.
    Ready,
}

impl WalletStatus {
    /// Whether a vault exists (Locked or Ready).
    #[must_use]
    pub fn is_initialized(self) -> bool {
        !matches!(self, WalletStatus::Uninitialized)
    }

    /// Whether the session is unlocked.
    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, WalletStatus::Ready)
    }
}

impl fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WalletStatus::Uninitialized => "uninitialized",
            WalletStatus::Locked => "locked",
            WalletStatus::Ready => "ready",
        };
        f.write_str(s)
    }
}

/// Front-end view of the session.
///
/// `accounts` is empty and `settings` is `None` unless `status` is `Ready`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    /// Current status.
    pub status: WalletStatus,
    /// Accounts exactly as reported by the vault.
    pub accounts: Vec<Account>,
    /// Opaque settings.
    pub settings: Option<Settings>,
}

impl WalletState {
    /// State for a status without session data.
    #[must_use]
    pub fn without_session(status: WalletStatus) -> Self {
        Self {
            status,
            accounts: Vec::new(),
            settings: None,
        }
    }
}

// =============================================================================
// CLUSTER B: ACCOUNTS
// =============================================================================

/// Public key hash identifying an account (unique key of the account list).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKeyHash(pub String);

impl PublicKeyHash {
    /// Wrap a raw public key hash.
    pub fn new(pkh: impl Into<String>) -> Self {
        Self(pkh.into())
    }

    /// Borrow as `&str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PublicKeyHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Key-derivation provenance of an account. Opaque to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Derived from the vault's own mnemonic.
    Hd,
    /// Imported from a raw private key or a foreign mnemonic.
    Imported,
    /// Imported from fundraiser credentials.
    Fundraiser,
}

/// A wallet account as reported by the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique key.
    pub public_key_hash: PublicKeyHash,
    /// Display name.
    pub name: String,
    /// Whether this is the default account.
    pub default: bool,
    /// Provenance.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// HD derivation index (HD accounts only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hd_index: Option<u32>,
}

// =============================================================================
// CLUSTER C: SETTINGS
// =============================================================================

/// Opaque settings mapping. Merged by the vault on update.
pub type Settings = BTreeMap<String, serde_json::Value>;
