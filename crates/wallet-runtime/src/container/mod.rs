//! # Subsystem Container
//!
//! Holds one instance of every subsystem, constructed in dependency order,
//! and the configuration they were built from.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, RuntimeConfig};
pub use subsystems::WalletContainer;
