//! Prometheus metrics for the Keyward background core.
//!
//! All metrics follow the naming convention: `kw_<component>_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // MESSAGE BUS
    // =========================================================================

    /// Bus requests by outcome
    pub static ref BUS_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("kw_bus_requests_total", "Requests sent over the message bus"),
        &["outcome"]  // outcome: completed/timeout/cancelled
    ).expect("metric creation failed");

    /// Broadcasts delivered
    pub static ref BUS_BROADCASTS: Counter = Counter::new(
        "kw_bus_broadcasts_total",
        "Broadcast notifications fanned out to subscribers"
    ).expect("metric creation failed");

    // =========================================================================
    // CONFIRMATIONS
    // =========================================================================

    /// Confirmations opened
    pub static ref CONFIRMATIONS_CREATED: CounterVec = CounterVec::new(
        Opts::new("kw_confirmations_created_total", "Confirmations opened"),
        &["kind"]  // kind: sign/dapp_permission/dapp_operation
    ).expect("metric creation failed");

    /// Confirmations settled
    pub static ref CONFIRMATIONS_SETTLED: CounterVec = CounterVec::new(
        Opts::new("kw_confirmations_settled_total", "Confirmations settled"),
        &["kind", "outcome"]  // outcome: approved/declined/timeout/failed
    ).expect("metric creation failed");

    // =========================================================================
    // PROTOCOL BRIDGE
    // =========================================================================

    /// Bridge translations
    pub static ref BRIDGE_TRANSLATIONS: CounterVec = CounterVec::new(
        Opts::new("kw_bridge_translations_total", "Beacon messages translated"),
        &["outcome"]  // outcome: ok or the wire error type
    ).expect("metric creation failed");

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Session transitions
    pub static ref SESSION_TRANSITIONS: CounterVec = CounterVec::new(
        Opts::new("kw_session_transitions_total", "Session state transitions"),
        &["to"]  // to: locked/ready
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(BUS_REQUESTS.clone()),
        Box::new(BUS_BROADCASTS.clone()),
        Box::new(CONFIRMATIONS_CREATED.clone()),
        Box::new(CONFIRMATIONS_SETTLED.clone()),
        Box::new(BRIDGE_TRANSLATIONS.clone()),
        Box::new(SESSION_TRANSITIONS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
