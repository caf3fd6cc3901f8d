//! # KW-04 Protocol Bridge
//!
//! Speaks the Beacon interoperability protocol on behalf of the request
//! gateway.
//!
//! **Subsystem ID:** 4
//!
//! - Wire messages are Base58Check-encoded JSON ([`codec`]).
//! - Permission and operation requests are served; `sign_payload_request`
//!   and `broadcast_request` answer `UNKNOWN_ERROR`.
//! - Custom networks answer `NETWORK_NOT_SUPPORTED` whatever the request.
//! - Gateway failures are mapped to the protocol's `ErrorType` by kind.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bridge;
pub mod codec;
pub mod config;
pub mod domain;
pub mod formatter;

// Re-exports
pub use bridge::ProtocolBridge;
pub use codec::{decode_message, encode_message, CodecError};
pub use config::{BridgeConfig, DEFAULT_BRIDGE_ID};
pub use domain::{BeaconRequest, BeaconResponse, BridgeFailure, ErrorType, ResponseBody};
pub use formatter::{BeaconOpParamFormatter, OpParamFormatter};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
