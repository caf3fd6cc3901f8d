//! # Domain Module
//!
//! Request shape rules and the per-origin grant table.

pub mod grants;
pub mod validation;

pub use grants::PermissionTable;
pub use validation::{validate_operation, validate_origin, validate_permission};
