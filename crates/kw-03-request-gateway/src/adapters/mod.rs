//! # Adapters
//!
//! `ConfirmingConsent` asks the user through the confirmation coordinator.
//! `MockOperationSender` stands in for the network in tests and demos.

pub mod confirming_consent;
pub mod mock_sender;

pub use confirming_consent::ConfirmingConsent;
pub use mock_sender::MockOperationSender;
