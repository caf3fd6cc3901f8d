//! Cross-subsystem flows.

pub mod harness;

mod dapp_flows;
mod wallet_flows;
