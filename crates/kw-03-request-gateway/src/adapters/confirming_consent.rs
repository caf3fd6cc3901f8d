//! Consent through user confirmations, with grants kept per origin.
//!
//! Approvals act on the open vault only: a permission takes its public key
//! from the vault, and an operation is handed to the sender only while the
//! session is Ready and a password came with the approval.

use crate::domain::PermissionTable;
use crate::ports::{ConsentProvider, OperationSender};
use async_trait::async_trait;
use kw_01_session_store::SessionStore;
use kw_02_confirmation::{Approval, ConfirmationCoordinator, ConfirmationError};
use shared_types::{
    ConfirmationPayload, DAppError, DAppErrorKind, DAppScope, DAppSession, OperationRequest,
    OperationResponse, PermissionRequest, PermissionResponse, VaultError, WalletError,
    WalletResult,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Default consent provider.
pub struct ConfirmingConsent {
    store: Arc<SessionStore>,
    coordinator: Arc<ConfirmationCoordinator>,
    sender: Arc<dyn OperationSender>,
    grants: Arc<PermissionTable>,
}

impl ConfirmingConsent {
    pub fn new(
        store: Arc<SessionStore>,
        coordinator: Arc<ConfirmationCoordinator>,
        sender: Arc<dyn OperationSender>,
    ) -> Self {
        Self {
            store,
            coordinator,
            sender,
            grants: Arc::new(PermissionTable::new()),
        }
    }

    /// The grant table.
    pub fn grant_table(&self) -> &Arc<PermissionTable> {
        &self.grants
    }
}

fn response_for(grant: &DAppSession) -> PermissionResponse {
    PermissionResponse {
        pkh: grant.pkh.clone(),
        public_key: grant.public_key.clone(),
        network: grant.network.clone(),
        scopes: vec![DAppScope::OperationRequest],
    }
}

/// A missing consent is reported to pages as `NotGranted`.
fn normalize(err: ConfirmationError) -> WalletError {
    match err {
        ConfirmationError::Declined(reason) => {
            DAppError::not_granted(format!("Declined ({reason})")).into()
        }
        ConfirmationError::Fault(err) => err,
    }
}

fn as_broadcast(err: WalletError) -> WalletError {
    match err {
        WalletError::DApp(e) if e.kind == DAppErrorKind::Broadcast => WalletError::DApp(e),
        other => DAppError::broadcast(other.to_string()).into(),
    }
}

#[async_trait]
impl ConsentProvider for ConfirmingConsent {
    async fn request_permission(
        &self,
        origin: &str,
        request: PermissionRequest,
    ) -> WalletResult<PermissionResponse> {
        if let Some(grant) = self.grants.matching(origin, &request) {
            debug!(origin, network = %grant.network, "Reusing existing grant");
            return Ok(response_for(&grant));
        }

        let payload = ConfirmationPayload::DAppPermission {
            origin: origin.to_string(),
            network: request.network.clone(),
            app_meta: request.app_meta.clone(),
        };
        let store = Arc::clone(&self.store);
        let grants = Arc::clone(&self.grants);
        let grant_origin = origin.to_string();
        let grant = self
            .coordinator
            .create_confirmation(payload, move |approval| async move {
                // The public key sent along with the decision is not trusted.
                let Approval::DAppPermission { pkh: Some(pkh), .. } = approval else {
                    return Err(DAppError::invalid_params("No account selected").into());
                };
                let account = pkh.clone();
                let public_key = store
                    .with_ready(|session| async move {
                        Ok(session.vault.reveal_public_key(&account).await?)
                    })
                    .await?;
                let grant = DAppSession {
                    origin: grant_origin,
                    network: request.network,
                    app_meta: request.app_meta,
                    pkh,
                    public_key,
                };
                grants.insert(grant.clone());
                Ok(grant)
            })
            .await
            .map_err(normalize)?;

        info!(origin, pkh = %grant.pkh, network = %grant.network, "Permission granted");
        Ok(response_for(&grant))
    }

    async fn request_operation(
        &self,
        origin: &str,
        request: OperationRequest,
    ) -> WalletResult<OperationResponse> {
        let grant = self
            .grants
            .get(origin)
            .ok_or_else(|| DAppError::not_granted("Origin holds no permission"))?;
        if grant.pkh != request.source_pkh {
            return Err(DAppError::not_found("Source account is not the granted one").into());
        }

        let payload = ConfirmationPayload::DAppOperation {
            origin: origin.to_string(),
            source_pkh: request.source_pkh.clone(),
            op_params: request.op_params.clone(),
        };
        let store = Arc::clone(&self.store);
        let sender = Arc::clone(&self.sender);
        let op_hash = self
            .coordinator
            .create_confirmation(payload, move |approval| async move {
                store
                    .with_ready(|_| async move {
                        let password = approval
                            .password()
                            .ok_or(WalletError::Vault(VaultError::InvalidPassword))?;
                        sender
                            .send(&grant, &request, password)
                            .await
                            .map_err(as_broadcast)
                    })
                    .await
            })
            .await
            .map_err(normalize)?;

        info!(origin, op_hash = %op_hash, "Operations broadcast");
        Ok(OperationResponse { op_hash })
    }

    fn revoke(&self, origin: &str) -> bool {
        let removed = self.grants.remove(origin);
        if removed {
            info!(origin, "Permission revoked");
        }
        removed
    }

    fn grants(&self) -> Vec<DAppSession> {
        self.grants.list()
    }
}
