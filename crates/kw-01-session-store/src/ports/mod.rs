//! # Ports
//!
//! Inbound: what the session subsystem offers. Outbound: the vault it needs.

pub mod inbound;
pub mod outbound;

pub use inbound::SessionApi;
pub use outbound::{UnlockedVault, VaultProvider};
