//! Bus configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time a caller waits for a response.
///
/// Longer than the confirmation deadline so a request that opens a
/// confirmation always sees it settle.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Message bus configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// How long `request` waits before failing with `BusError::Timeout`.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
