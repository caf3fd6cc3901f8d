//! # Inbound Ports
//!
//! API trait defining what the gateway offers to page traffic.

use async_trait::async_trait;
use serde_json::Value;
use shared_types::{
    DAppResponse, DAppSession, OperationRequest, OperationResponse, PermissionRequest,
    PermissionResponse, WalletResult,
};

/// Request Gateway API - inbound port.
///
/// Both request flows require an initialized wallet; a locked one is enough.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Ask for an account to be exposed to `origin`.
    async fn handle_permission(
        &self,
        origin: &str,
        request: PermissionRequest,
    ) -> WalletResult<PermissionResponse>;

    /// Ask for operations to be signed and broadcast for `origin`.
    async fn handle_operation(
        &self,
        origin: &str,
        request: OperationRequest,
    ) -> WalletResult<OperationResponse>;

    /// Dispatch a raw page message by its `type` tag.
    ///
    /// Returns `None` for unknown or missing tags.
    async fn process_raw(&self, origin: &str, raw: &Value) -> Option<WalletResult<DAppResponse>>;

    /// Drop the grant held by `origin`.
    fn revoke(&self, origin: &str) -> bool;

    /// Current grants.
    fn permissions(&self) -> Vec<DAppSession>;
}
