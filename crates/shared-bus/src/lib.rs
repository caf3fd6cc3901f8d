//! # Shared Bus - Message Bus Between Contexts
//!
//! Connects the privileged background context to its front-end contexts.
//!
//! ## Message Kinds
//!
//! ```text
//! ┌──────────────┐   request(id)     ┌──────────────┐
//! │  Front-end   │ ────────────────► │  Background  │
//! │              │ ◄──────────────── │   handlers   │
//! └──────────────┘   response(id)    └──────────────┘
//!        ▲                                  │
//!        └────────── broadcast() ───────────┘
//! ```
//!
//! - **Requests** are correlated by a fresh `MessageId`; responses may arrive
//!   in any order.
//! - **Broadcasts** go to every subscriber present at the time of the call.
//! - A caller that gets no answer within `BusConfig::request_timeout` receives
//!   `BusError::Timeout`.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod config;
pub mod error;
pub mod handler;
pub mod pending;
pub mod subscriber;

// Re-export main types
pub use bus::MessageBus;
pub use config::{BusConfig, DEFAULT_REQUEST_TIMEOUT};
pub use error::BusError;
pub use handler::{RequestHandler, RequestRegistration};
pub use pending::{BusReply, PendingRequestStore, PendingStats};
pub use subscriber::{BroadcastReceiver, Subscription, SubscriptionError};

/// Current protocol version for bus envelopes.
pub const PROTOCOL_VERSION: u16 = shared_types::BusEnvelope::CURRENT_VERSION;
