//! # KW-02 Confirmation Coordinator
//!
//! Gates every irreversible action behind an explicit, time-bounded user
//! decision.
//!
//! **Subsystem ID:** 2
//!
//! ## Guarantees
//!
//! - Each confirmation settles exactly once: approved, declined, or timed out.
//! - The guarded action runs at most once, and only on approval.
//! - `ConfirmExpired` is broadcast exactly once, after which decisions for
//!   the id are ignored.
//!
//! ## Module Structure
//!
//! ```text
//! kw-02-confirmation/
//! ├── domain/          # Approval, Decision, Outcome, ConfirmationError
//! ├── config.rs        # ConfirmationConfig (60 s deadline)
//! └── coordinator.rs   # ConfirmationCoordinator
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod coordinator;
pub mod domain;

// Re-exports
pub use config::{ConfirmationConfig, AUTODECLINE_AFTER};
pub use coordinator::ConfirmationCoordinator;
pub use domain::{Approval, ConfirmationError, Decision, Outcome, PendingConfirmation};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
