//! Bus errors.

use shared_types::MessageId;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failure of a bus request.
///
/// A handler's own failure is not a `BusError`; it arrives as the `Err` side
/// of the response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// No response arrived in time.
    #[error("Request {id} timed out after {timeout:?}")]
    Timeout { id: MessageId, timeout: Duration },

    /// The pending entry was dropped before a response arrived.
    #[error("Request {0} was cancelled")]
    Cancelled(MessageId),
}
