//! # Domain Module
//!
//! Session state and account-name rules.

pub mod state;
pub mod validation;

pub use state::{ReadyHandle, ReadySession, SessionState};
pub use validation::{validate_account_name, ACCOUNT_NAME_PATTERN};
