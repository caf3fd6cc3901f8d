//! # Ports
//!
//! Inbound: the gateway API. Outbound: consent and operation broadcasting.

pub mod inbound;
pub mod outbound;

pub use inbound::GatewayApi;
pub use outbound::{ConsentProvider, OperationSender};
