//! # KW-01 Session Store
//!
//! The wallet session state machine. Every privileged action is a guarded
//! transition or read over it.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Guards
//!
//! | Guard | Fails with | Used by |
//! |-------|------------|---------|
//! | `with_ready` | `NotReady` | account, key, settings and signing operations |
//! | `with_initialized` | `NotInitialized` | dApp permission and operation flows |
//!
//! ## Module Structure
//!
//! ```text
//! kw-01-session-store/
//! ├── domain/          # SessionState, account name rules
//! ├── ports/           # SessionApi (inbound), VaultProvider/UnlockedVault (outbound)
//! ├── adapters/        # InMemoryVault
//! ├── store.rs         # SessionStore: transitions, guards, listeners
//! └── service.rs       # SessionService: the account/key/settings operations
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod store;

// Re-exports
pub use adapters::InMemoryVault;
pub use domain::{
    validate_account_name, ReadyHandle, ReadySession, SessionState, ACCOUNT_NAME_PATTERN,
};
pub use ports::{SessionApi, UnlockedVault, VaultProvider};
pub use service::SessionService;
pub use store::{SessionStore, StateSubscription};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
