//! Beacon error taxonomy and failure classification.

use serde::{Deserialize, Serialize};
use shared_types::{DAppErrorKind, WalletError};
use std::fmt;
use thiserror::Error;

/// Error types understood by Beacon peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    NetworkNotSupported,
    ParametersInvalidError,
    NotGrantedError,
    BroadcastError,
    UnknownError,
}

impl ErrorType {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorType::NetworkNotSupported => "NETWORK_NOT_SUPPORTED",
            ErrorType::ParametersInvalidError => "PARAMETERS_INVALID_ERROR",
            ErrorType::NotGrantedError => "NOT_GRANTED_ERROR",
            ErrorType::BroadcastError => "BROADCAST_ERROR",
            ErrorType::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a translation did not produce a success response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeFailure {
    /// Already expressed in the protocol's terms.
    #[error("{0}")]
    Protocol(ErrorType),

    /// Raised by the gateway or below.
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl BridgeFailure {
    /// Classify into the protocol taxonomy.
    #[must_use]
    pub fn error_type(&self) -> ErrorType {
        match self {
            BridgeFailure::Wallet(WalletError::DApp(e)) if e.kind == DAppErrorKind::Broadcast => {
                ErrorType::BroadcastError
            }
            BridgeFailure::Wallet(WalletError::DApp(e)) => match e.kind {
                DAppErrorKind::InvalidParams => ErrorType::ParametersInvalidError,
                DAppErrorKind::NotFound | DAppErrorKind::NotGranted => ErrorType::NotGrantedError,
                DAppErrorKind::Broadcast => ErrorType::BroadcastError,
            },
            BridgeFailure::Protocol(error_type) => *error_type,
            BridgeFailure::Wallet(_) => ErrorType::UnknownError,
        }
    }
}
