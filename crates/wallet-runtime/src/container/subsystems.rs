//! # Wallet Container
//!
//! ## Construction Order
//!
//! ```text
//! Level 0: Message Bus
//! Level 1: Session Store (reads vault existence)
//! Level 2: Confirmation Coordinator (publishes on the bus)
//! Level 3: Request Gateway (store + consent over the coordinator)
//! Level 4: Protocol Bridge (over the gateway)
//! ```

use crate::container::config::RuntimeConfig;
use kw_01_session_store::{SessionService, SessionStore, VaultProvider};
use kw_02_confirmation::{ConfirmationConfig, ConfirmationCoordinator};
use kw_03_request_gateway::{ConfirmingConsent, OperationSender, RequestGateway};
use kw_04_protocol_bridge::ProtocolBridge;
use shared_bus::MessageBus;
use shared_types::WalletResult;
use std::sync::Arc;
use tracing::info;

/// Every subsystem of one runtime.
pub struct WalletContainer {
    pub config: RuntimeConfig,

    /// Message Bus
    pub bus: MessageBus,

    /// Session Store (Subsystem 1)
    pub store: Arc<SessionStore>,
    /// Account, key and settings operations over the store.
    pub session: Arc<SessionService>,

    /// Confirmation Coordinator (Subsystem 2)
    pub coordinator: Arc<ConfirmationCoordinator>,

    /// Request Gateway (Subsystem 3)
    pub gateway: Arc<RequestGateway>,

    /// Protocol Bridge (Subsystem 4)
    pub bridge: Arc<ProtocolBridge>,
}

impl WalletContainer {
    /// Build every subsystem over `vault` and `sender`.
    ///
    /// Fails only if the vault cannot report whether it exists.
    pub async fn new(
        config: RuntimeConfig,
        vault: Arc<dyn VaultProvider>,
        sender: Arc<dyn OperationSender>,
    ) -> WalletResult<Self> {
        let bus = MessageBus::new(config.bus.clone());

        let store = Arc::new(SessionStore::load(vault).await?);
        let session = Arc::new(SessionService::new(Arc::clone(&store)));
        info!(status = %store.status(), "Session store loaded");

        // Pages always get the fixed auto-decline deadline.
        let coordinator = Arc::new(ConfirmationCoordinator::new(
            bus.clone(),
            ConfirmationConfig::default(),
        ));

        let consent = Arc::new(ConfirmingConsent::new(
            Arc::clone(&store),
            Arc::clone(&coordinator),
            sender,
        ));
        let gateway = Arc::new(RequestGateway::new(Arc::clone(&store), consent));

        let bridge = Arc::new(ProtocolBridge::new(
            gateway.clone(),
            config.bridge.clone(),
        ));

        Ok(Self {
            config,
            bus,
            store,
            session,
            coordinator,
            gateway,
            bridge,
        })
    }
}
