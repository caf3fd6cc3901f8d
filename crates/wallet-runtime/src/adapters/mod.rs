//! # Adapters
//!
//! Connections from front-end contexts into the bus.

pub mod frontend;

pub use frontend::FrontendConnection;
