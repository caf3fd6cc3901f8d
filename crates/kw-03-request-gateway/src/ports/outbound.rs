//! # Outbound Ports
//!
//! What the gateway needs from the outside: someone to obtain consent, and
//! someone to put approved operations on the network.

use async_trait::async_trait;
use shared_types::{
    DAppSession, OperationRequest, OperationResponse, Password, PermissionRequest,
    PermissionResponse, WalletResult,
};

/// Obtains user consent for dApp requests and keeps the resulting grants.
///
/// Requests reaching a provider have already been validated.
#[async_trait]
pub trait ConsentProvider: Send + Sync {
    /// Grant (or reuse a grant of) an account to `origin`.
    async fn request_permission(
        &self,
        origin: &str,
        request: PermissionRequest,
    ) -> WalletResult<PermissionResponse>;

    /// Have operations approved and broadcast for `origin`.
    async fn request_operation(
        &self,
        origin: &str,
        request: OperationRequest,
    ) -> WalletResult<OperationResponse>;

    /// Drop the grant held by `origin`.
    fn revoke(&self, origin: &str) -> bool;

    /// Current grants.
    fn grants(&self) -> Vec<DAppSession>;
}

/// Forges, signs and injects approved operations. Returns the operation hash.
///
/// Only called while the session is Ready, with the password the user
/// approved with.
#[async_trait]
pub trait OperationSender: Send + Sync {
    async fn send(
        &self,
        grant: &DAppSession,
        request: &OperationRequest,
        password: &Password,
    ) -> WalletResult<String>;
}
