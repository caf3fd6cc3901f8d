//! # Adapters
//!
//! Concrete implementations of outbound ports.

pub mod memory_vault;

pub use memory_vault::InMemoryVault;
