//! # Keyward Telemetry
//!
//! Structured logging and Prometheus metrics for the background core.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keyward_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config).expect("Failed to init telemetry");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KW_SERVICE_NAME` | `keyward` | Service name in log lines |
//! | `KW_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `KW_CONSOLE_OUTPUT` | `true` | Emit logs to stdout |
//! | `KW_JSON_LOGS` | `false` | Emit JSON instead of human-readable lines |

#![warn(clippy::all)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, BRIDGE_TRANSLATIONS, BUS_BROADCASTS, BUS_REQUESTS,
    CONFIRMATIONS_CREATED, CONFIRMATIONS_SETTLED, REGISTRY, SESSION_TRANSITIONS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Register metrics and install the global log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
