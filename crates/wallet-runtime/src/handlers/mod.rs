//! # Bus Handlers
//!
//! The background side of the message bus.

pub mod background;

pub use background::BackgroundHandler;
