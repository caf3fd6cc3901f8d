//! Confirmation configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Time a confirmation waits for a decision before declining itself.
pub const AUTODECLINE_AFTER: Duration = Duration::from_millis(60_000);

/// Coordinator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Deadline measured from creation. Only tests should change this.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout: AUTODECLINE_AFTER,
        }
    }
}
