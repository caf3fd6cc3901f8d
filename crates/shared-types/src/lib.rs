//! # Shared Types Crate
//!
//! Entities, bus payloads and errors shared by every Keyward subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-context types are defined here.
//! - **Closed Message Set**: requests, responses and broadcasts are enums; an
//!   unknown tag fails to decode instead of being silently ignored.
//! - **Secrets Stay Redacted**: passwords, mnemonics and private keys travel as
//!   [`SecretString`] and never appear in `Debug` output.

#![warn(clippy::all)]

pub mod correlation;
pub mod dapp;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod ipc;
pub mod secret;

pub use correlation::{ConfirmationId, CorrelationId, MessageId};
pub use dapp::*;
pub use entities::*;
pub use envelope::{BusEnvelope, EnvelopeBody};
pub use errors::*;
pub use ipc::*;
pub use secret::{Password, SecretString};
