//! # Runtime Configuration
//!
//! Unified configuration for every subsystem.
//!
//! Loaded from TOML, then overridden from `KW_*` environment variables:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `KW_REQUEST_TIMEOUT` | `bus.request_timeout` (humantime, e.g. `90s`) |
//! | `KW_BRIDGE_ID` | `bridge.bridge_id` |
//! | `KW_LOG_LEVEL`, `KW_JSON_LOGS`, ... | `telemetry` |
//!
//! The confirmation deadline is fixed at [`AUTODECLINE_AFTER`] and is not
//! part of this configuration; unknown sections are rejected.

use humantime_serde::re::humantime;
use keyward_telemetry::TelemetryConfig;
use kw_02_confirmation::AUTODECLINE_AFTER;
use kw_04_protocol_bridge::BridgeConfig;
use serde::{Deserialize, Serialize};
use shared_bus::BusConfig;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub bus: BusConfig,
    pub bridge: BridgeConfig,
    pub telemetry: TelemetryConfig,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("bridge id must not be empty")]
    EmptyBridgeId,
}

impl RuntimeConfig {
    /// Parse a TOML document. Missing sections take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `KW_*` environment overrides. Unparseable values are ignored
    /// with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(timeout) = env_duration("KW_REQUEST_TIMEOUT") {
            self.bus.request_timeout = timeout;
        }
        if let Ok(id) = std::env::var("KW_BRIDGE_ID") {
            self.bridge.bridge_id = id;
        }
        self.telemetry = self.telemetry.with_env_overrides();
        self
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("bus.request_timeout"));
        }
        if self.bridge.bridge_id.trim().is_empty() {
            return Err(ConfigError::EmptyBridgeId);
        }
        if self.bus.request_timeout <= AUTODECLINE_AFTER {
            warn!(
                request_timeout = ?self.bus.request_timeout,
                confirmation_timeout = ?AUTODECLINE_AFTER,
                "Bus requests may time out before their confirmation settles"
            );
        }
        Ok(())
    }
}

fn env_duration(name: &str) -> Option<Duration> {
    let raw = std::env::var(name).ok()?;
    match humantime::parse_duration(&raw) {
        Ok(duration) => Some(duration),
        Err(e) => {
            warn!(variable = name, value = %raw, error = %e, "Ignoring invalid duration");
            None
        }
    }
}
