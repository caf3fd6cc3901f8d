//! Bridge configuration.

use serde::{Deserialize, Serialize};

/// Identity used when none is configured.
pub const DEFAULT_BRIDGE_ID: &str = "keyward";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Identity stamped on every response as `beaconId`.
    pub bridge_id: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge_id: DEFAULT_BRIDGE_ID.to_string(),
        }
    }
}
