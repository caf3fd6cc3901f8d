//! # Wallet Runtime
//!
//! Assembles the privileged background core: one instance of each
//! subsystem, wired over a single message bus.
//!
//! ```text
//! ┌────────────┐  envelopes  ┌──────────────────┐
//! │ Front-ends │ ◄─────────► │ FrontendConnection│
//! └────────────┘             └────────┬─────────┘
//!                                     │ MessageBus
//!                  ┌──────────────────┼──────────────────────┐
//!                  ▼                  ▼                      ▼
//!          BackgroundHandler   confirmation handlers   StateUpdated
//!                  │                  ▲                      ▲
//!     ┌────────────┼──────────┐       │                      │
//!     ▼            ▼          ▼       │                      │
//!  Session     Gateway ◄── Bridge     │                      │
//!   Store         │                   │                      │
//!     │           └── Coordinator ────┘                      │
//!     └──────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod runtime;
pub mod wiring;

pub use adapters::FrontendConnection;
pub use container::{ConfigError, RuntimeConfig, WalletContainer};
pub use handlers::BackgroundHandler;
pub use runtime::WalletRuntime;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
