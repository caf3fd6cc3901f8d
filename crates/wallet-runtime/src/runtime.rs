//! # Wallet Runtime
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Register metrics
//! 3. Build the subsystem container
//! 4. Forward session changes as `StateUpdated`
//! 5. Register the background request handler

use crate::adapters::FrontendConnection;
use crate::container::{RuntimeConfig, WalletContainer};
use crate::handlers::BackgroundHandler;
use crate::wiring::forward_state_updates;
use anyhow::{Context, Result};
use kw_01_session_store::{StateSubscription, VaultProvider};
use kw_03_request_gateway::OperationSender;
use shared_bus::{MessageBus, RequestRegistration};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// A running background core.
///
/// Dropping it unregisters the background handler and stops forwarding
/// state updates.
pub struct WalletRuntime {
    container: Arc<WalletContainer>,
    _handler: RequestRegistration,
    _state_updates: StateSubscription,
}

impl WalletRuntime {
    /// Build and start the runtime over `vault` and `sender`.
    ///
    /// Logging is not installed here; call
    /// [`keyward_telemetry::init_telemetry`] once per process first.
    pub async fn start(
        config: RuntimeConfig,
        vault: Arc<dyn VaultProvider>,
        sender: Arc<dyn OperationSender>,
    ) -> Result<Self> {
        config.validate().context("Invalid runtime configuration")?;
        keyward_telemetry::register_metrics().context("Failed to register metrics")?;

        let container = Arc::new(
            WalletContainer::new(config, vault, sender)
                .await
                .context("Failed to build subsystems")?,
        );

        let state_updates = forward_state_updates(&container.store, &container.bus);
        let handler = container
            .bus
            .on_request(Arc::new(BackgroundHandler::new(Arc::clone(&container))));

        info!(
            status = %container.store.status(),
            bridge_id = %container.bridge.bridge_id(),
            "Wallet runtime started"
        );

        Ok(Self {
            container,
            _handler: handler,
            _state_updates: state_updates,
        })
    }

    /// The bus front-ends talk to.
    #[must_use]
    pub fn bus(&self) -> &MessageBus {
        &self.container.bus
    }

    /// The subsystems.
    #[must_use]
    pub fn container(&self) -> Arc<WalletContainer> {
        Arc::clone(&self.container)
    }

    /// Attach a front-end speaking serialized envelopes.
    pub fn connect_frontend(&self) -> (FrontendConnection, mpsc::UnboundedReceiver<String>) {
        FrontendConnection::connect(&self.container.bus)
    }
}
