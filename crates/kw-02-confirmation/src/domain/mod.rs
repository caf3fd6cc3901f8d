//! # Domain Module
//!
//! Approvals, outcomes and errors of the confirmation protocol.

pub mod approval;
pub mod error;
pub mod pending;

pub use approval::{Approval, Decision};
pub use error::ConfirmationError;
pub use pending::{Outcome, PendingConfirmation};
