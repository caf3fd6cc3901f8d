//! # KW-03 Request Gateway
//!
//! Entry point for requests coming from web pages. Validates their shape,
//! requires an initialized wallet, attaches the origin and obtains consent
//! through the confirmation coordinator.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Flows
//!
//! | Request | Needs | On approval |
//! |---------|-------|-------------|
//! | `PermissionRequest` | non-empty network and app name | grant recorded for the origin |
//! | `OperationRequest` | a grant for the origin and its account | operations handed to the `OperationSender` |
//!
//! Declines and timeouts reach the page as `NotGranted`.
//!
//! ## Module Structure
//!
//! ```text
//! kw-03-request-gateway/
//! ├── domain/          # shape validation, PermissionTable
//! ├── ports/           # GatewayApi (inbound), ConsentProvider/OperationSender (outbound)
//! ├── adapters/        # ConfirmingConsent, MockOperationSender
//! └── service.rs       # RequestGateway
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{ConfirmingConsent, MockOperationSender};
pub use domain::{validate_operation, validate_permission, PermissionTable};
pub use ports::{ConsentProvider, GatewayApi, OperationSender};
pub use service::RequestGateway;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
