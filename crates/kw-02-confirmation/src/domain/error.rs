//! Confirmation errors.

use shared_types::{DeclineReason, WalletError};
use thiserror::Error;

/// How a confirmation can fail to produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmationError {
    /// No consent. An expected outcome.
    #[error("Declined ({0})")]
    Declined(DeclineReason),

    /// The approved action failed. Carried unchanged.
    #[error(transparent)]
    Fault(WalletError),
}

impl ConfirmationError {
    /// Whether the user (or the clock) said no.
    #[must_use]
    pub fn is_declined(&self) -> bool {
        matches!(self, ConfirmationError::Declined(_))
    }
}

impl From<ConfirmationError> for WalletError {
    fn from(err: ConfirmationError) -> Self {
        match err {
            ConfirmationError::Declined(reason) => WalletError::Declined(reason),
            ConfirmationError::Fault(inner) => inner,
        }
    }
}
