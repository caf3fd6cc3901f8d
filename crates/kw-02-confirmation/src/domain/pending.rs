//! Pending confirmation records.

use shared_types::{ConfirmationId, ConfirmationKind};
use std::fmt;
use tokio::time::Instant;

/// A confirmation awaiting a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingConfirmation {
    /// Unique id, published in `ConfirmRequested`.
    pub id: ConfirmationId,
    /// What is being confirmed.
    pub kind: ConfirmationKind,
    /// When it declines itself.
    pub deadline: Instant,
}

/// How a confirmation settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Approved and the action succeeded.
    Approved,
    /// Explicitly declined.
    Declined,
    /// Nobody answered in time.
    Timeout,
    /// Approved but the action failed.
    Failed,
}

impl Outcome {
    /// Metric label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Approved => "approved",
            Outcome::Declined => "declined",
            Outcome::Timeout => "timeout",
            Outcome::Failed => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
