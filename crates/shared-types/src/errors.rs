//! # Error Types
//!
//! Errors that cross the message bus. They are `Clone + Serialize` so a
//! failed response can carry them to the front-end unchanged.

use crate::entities::PublicKeyHash;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a confirmation was declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclineReason {
    /// The user rejected the request.
    Explicit,
    /// No decision arrived before the deadline.
    Timeout,
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclineReason::Explicit => f.write_str("explicit"),
            DeclineReason::Timeout => f.write_str("timeout"),
        }
    }
}

/// Failures reported by the vault. Passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum VaultError {
    /// Password does not decrypt the vault.
    #[error("Invalid password")]
    InvalidPassword,

    /// Private key could not be parsed or decrypted.
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Mnemonic phrase is malformed.
    #[error("Invalid mnemonic")]
    InvalidMnemonic,

    /// No vault has been created.
    #[error("Vault not found")]
    NotFound,

    /// No account with this public key hash.
    #[error("Account not found: {0}")]
    AccountNotFound(PublicKeyHash),

    /// An account with this public key hash already exists.
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(PublicKeyHash),

    /// Removing the account would leave the vault empty.
    #[error("Cannot remove the last account")]
    LastAccount,

    /// Signing failed inside the vault.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Storage backend failure.
    #[error("Vault storage error: {0}")]
    Storage(String),
}

/// Kind of a dApp-facing failure. Matched by kind, never by message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DAppErrorKind {
    /// Request shape is invalid.
    InvalidParams,
    /// The referenced account or grant does not exist.
    NotFound,
    /// The origin holds no permission, or the user declined.
    NotGranted,
    /// The operation failed while being broadcast to the network.
    Broadcast,
}

/// A dApp-facing failure with its structured kind.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct DAppError {
    /// Structured kind.
    pub kind: DAppErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl DAppError {
    /// Create an error of the given kind.
    pub fn new(kind: DAppErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for `InvalidParams`.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(DAppErrorKind::InvalidParams, message)
    }

    /// Shorthand for `NotGranted`.
    pub fn not_granted(message: impl Into<String>) -> Self {
        Self::new(DAppErrorKind::NotGranted, message)
    }

    /// Shorthand for `NotFound`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(DAppErrorKind::NotFound, message)
    }

    /// Shorthand for `Broadcast`.
    pub fn broadcast(message: impl Into<String>) -> Self {
        Self::new(DAppErrorKind::Broadcast, message)
    }
}

/// Every failure a privileged action can report.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum WalletError {
    /// No vault exists.
    #[error("Not initialized")]
    NotInitialized,

    /// The session is not unlocked.
    #[error("Not ready")]
    NotReady,

    /// A vault already exists.
    #[error("Already initialized")]
    AlreadyInitialized,

    /// Account name failed validation.
    #[error("Invalid name. It should be: 1-16 characters, without special")]
    InvalidName,

    /// Consent was not given. An expected outcome, not a defect.
    #[error("Declined ({0})")]
    Declined(DeclineReason),

    /// Vault failure, unchanged.
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// dApp-facing failure.
    #[error(transparent)]
    DApp(#[from] DAppError),

    /// The request could not be understood.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Whether this is an expected outcome rather than a fault.
    #[must_use]
    pub fn is_declined(&self) -> bool {
        matches!(self, WalletError::Declined(_))
    }
}

/// Result alias for privileged actions.
pub type WalletResult<T> = Result<T, WalletError>;
