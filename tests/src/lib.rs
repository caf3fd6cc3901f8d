//! # Keyward Test Suite
//!
//! End-to-end flows over a started [`wallet_runtime::WalletRuntime`], driven
//! through the bus exactly as a front-end would.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs        # Runtime + broadcast queue fixture
//!     ├── wallet_flows.rs   # Session, signing and confirmation lifecycle
//!     └── dapp_flows.rs     # Native dApp and Beacon traffic
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p kw-tests
//! cargo test -p kw-tests integration::dapp_flows::
//! ```

#![allow(dead_code)]

pub mod integration;
