//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error, or an EnvFilter directive)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "keyward".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KW_SERVICE_NAME`: Service name (default: keyward)
    /// - `KW_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `KW_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `KW_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `KW_*` environment overrides on top of this configuration.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(name) = env::var("KW_SERVICE_NAME") {
            self.service_name = name;
        }

        if let Ok(level) = env::var("KW_LOG_LEVEL").or_else(|_| env::var("RUST_LOG")) {
            self.log_level = level;
        }

        if let Ok(v) = env::var("KW_CONSOLE_OUTPUT") {
            self.console_output = v.to_lowercase() != "false" && v != "0";
        }

        if let Ok(v) = env::var("KW_JSON_LOGS") {
            self.json_logs = v.to_lowercase() == "true" || v == "1";
        }

        self
    }
}
