//! # Wiring
//!
//! Connections between subsystems that are not request/response calls.

pub mod state_updates;

pub use state_updates::forward_state_updates;
