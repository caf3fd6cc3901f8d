//! # Test Harness
//!
//! A started runtime over the in-memory vault and a mock operation sender,
//! plus a queue of every broadcast it emits.

use kw_01_session_store::InMemoryVault;
use kw_03_request_gateway::MockOperationSender;
use shared_bus::{BroadcastReceiver, BusError, MessageBus};
use shared_types::{
    ConfirmationId, ConfirmationPayload, Password, PublicKeyHash, WalletBroadcast, WalletError,
    WalletRequest, WalletResponse, WalletState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use wallet_runtime::{RuntimeConfig, WalletRuntime};

pub const PASSWORD: &str = "correct horse battery";
pub const OP_HASH: &str = "op123";

pub struct Harness {
    pub runtime: WalletRuntime,
    pub vault: Arc<InMemoryVault>,
    pub sender: Arc<MockOperationSender>,
    pub broadcasts: BroadcastReceiver,
}

impl Harness {
    pub async fn start() -> Self {
        let vault = Arc::new(InMemoryVault::new());
        let sender = Arc::new(MockOperationSender::succeeding(OP_HASH));
        let runtime = WalletRuntime::start(RuntimeConfig::default(), vault.clone(), sender.clone())
            .await
            .expect("runtime starts");
        let broadcasts = runtime.bus().subscribe_channel();
        Self {
            runtime,
            vault,
            sender,
            broadcasts,
        }
    }

    /// A runtime with a wallet created and unlocked.
    pub async fn ready() -> Self {
        let mut harness = Self::start().await;
        harness
            .ok(WalletRequest::NewWalletRequest {
                password: Password::new(PASSWORD),
                mnemonic: None,
            })
            .await;
        harness.broadcasts.drain();
        harness
    }

    pub fn bus(&self) -> &MessageBus {
        self.runtime.bus()
    }

    /// Send a request and return the handler's answer.
    pub async fn send(&self, request: WalletRequest) -> Result<WalletResponse, WalletError> {
        self.bus().request(request).await.expect("bus delivers")
    }

    /// Send a request that must succeed.
    pub async fn ok(&self, request: WalletRequest) -> WalletResponse {
        let type_name = request.type_name();
        self.send(request)
            .await
            .unwrap_or_else(|e| panic!("{type_name} failed: {e}"))
    }

    /// Send a request from a separate task, as a second front-end would.
    pub fn spawn(
        &self,
        request: WalletRequest,
    ) -> JoinHandle<Result<Result<WalletResponse, WalletError>, BusError>> {
        let bus = self.bus().clone();
        tokio::spawn(async move { bus.request(request).await })
    }

    pub async fn state(&self) -> WalletState {
        match self.ok(WalletRequest::GetStateRequest).await {
            WalletResponse::GetStateResponse { state } => state,
            other => panic!("unexpected response: {other:?}"),
        }
    }

    pub async fn first_account(&self) -> PublicKeyHash {
        self.state().await.accounts[0].public_key_hash.clone()
    }

    pub async fn public_key(&self, pkh: &PublicKeyHash) -> String {
        match self
            .ok(WalletRequest::RevealPublicKeyRequest {
                account_public_key_hash: pkh.clone(),
            })
            .await
        {
            WalletResponse::RevealPublicKeyResponse { public_key } => public_key,
            other => panic!("unexpected response: {other:?}"),
        }
    }

    /// Wait for the next `ConfirmRequested`, skipping state updates and the
    /// expiry of confirmations already settled.
    pub async fn next_confirmation(&mut self) -> (ConfirmationId, ConfirmationPayload) {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(5), self.broadcasts.recv())
                .await
                .expect("confirmation requested in time")
                .expect("bus alive");
            match message {
                WalletBroadcast::ConfirmRequested { id, payload } => return (id, payload),
                WalletBroadcast::StateUpdated | WalletBroadcast::ConfirmExpired { .. } => continue,
            }
        }
    }

    /// Ids of every `ConfirmExpired` queued so far.
    pub fn expired(&mut self) -> Vec<ConfirmationId> {
        self.broadcasts
            .drain()
            .into_iter()
            .filter_map(|m| match m {
                WalletBroadcast::ConfirmExpired { id } => Some(id),
                _ => None,
            })
            .collect()
    }
}
