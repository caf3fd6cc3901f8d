//! # Background Request Handler
//!
//! Answers every front-end request except confirmation decisions, which
//! belong to the handlers the coordinator registers per confirmation.
//!
//! ```text
//! front-end ──► bus ──► BackgroundHandler ──┬─► SessionService   (wallet, accounts, keys)
//!                                           ├─► sign flow        (with_ready + confirmation)
//!                                           ├─► RequestGateway   (PageRequest: DApp)
//!                                           └─► ProtocolBridge   (PageRequest: Beacon)
//! ```

use crate::container::WalletContainer;
use async_trait::async_trait;
use kw_01_session_store::SessionApi;
use kw_03_request_gateway::GatewayApi;
use shared_bus::{BusReply, RequestHandler};
use shared_types::{
    ConfirmationId, ConfirmationKind, ConfirmationPayload, MessageId, PagePayload, PageReply,
    Password, PublicKeyHash, WalletError, WalletRequest, WalletResponse, WalletResult,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Handler registered once per runtime.
pub struct BackgroundHandler {
    container: Arc<WalletContainer>,
}

impl BackgroundHandler {
    pub fn new(container: Arc<WalletContainer>) -> Self {
        Self { container }
    }

    async fn process(&self, request: &WalletRequest) -> WalletResult<WalletResponse> {
        let session = &self.container.session;
        let response = match request {
            WalletRequest::GetStateRequest => WalletResponse::GetStateResponse {
                state: session.state(),
            },
            WalletRequest::NewWalletRequest { password, mnemonic } => {
                session.new_wallet(password, mnemonic.as_ref()).await?;
                WalletResponse::NewWalletResponse
            }
            WalletRequest::UnlockRequest { password } => {
                session.unlock(password).await?;
                WalletResponse::UnlockResponse
            }
            WalletRequest::LockRequest => {
                session.lock()?;
                WalletResponse::LockResponse
            }
            WalletRequest::CreateAccountRequest { name } => {
                session.create_account(name.as_deref()).await?;
                WalletResponse::CreateAccountResponse
            }
            WalletRequest::RevealPrivateKeyRequest {
                account_public_key_hash,
                password,
            } => WalletResponse::RevealPrivateKeyResponse {
                private_key: session
                    .reveal_private_key(account_public_key_hash, password)
                    .await?,
            },
            WalletRequest::RevealMnemonicRequest { password } => {
                WalletResponse::RevealMnemonicResponse {
                    mnemonic: session.reveal_mnemonic(password).await?,
                }
            }
            WalletRequest::RevealPublicKeyRequest {
                account_public_key_hash,
            } => WalletResponse::RevealPublicKeyResponse {
                public_key: session.reveal_public_key(account_public_key_hash).await?,
            },
            WalletRequest::RemoveAccountRequest {
                account_public_key_hash,
                password,
            } => {
                session
                    .remove_account(account_public_key_hash, password)
                    .await?;
                WalletResponse::RemoveAccountResponse
            }
            WalletRequest::EditAccountRequest {
                account_public_key_hash,
                name,
            } => {
                session.edit_account(account_public_key_hash, name).await?;
                WalletResponse::EditAccountResponse
            }
            WalletRequest::ImportAccountRequest {
                private_key,
                enc_password,
            } => {
                session
                    .import_account(private_key, enc_password.as_ref())
                    .await?;
                WalletResponse::ImportAccountResponse
            }
            WalletRequest::ImportMnemonicAccountRequest {
                mnemonic,
                password,
                derivation_path,
            } => {
                session
                    .import_mnemonic_account(mnemonic, password.as_ref(), derivation_path.as_deref())
                    .await?;
                WalletResponse::ImportMnemonicAccountResponse
            }
            WalletRequest::ImportFundraiserAccountRequest {
                email,
                password,
                mnemonic,
            } => {
                session
                    .import_fundraiser_account(email, password, mnemonic)
                    .await?;
                WalletResponse::ImportFundraiserAccountResponse
            }
            WalletRequest::UpdateSettingsRequest { settings } => {
                session.update_settings(settings).await?;
                WalletResponse::UpdateSettingsResponse
            }
            WalletRequest::SignRequest {
                account_public_key_hash,
                bytes,
                watermark,
            } => {
                self.sign(account_public_key_hash.clone(), bytes.clone(), watermark.clone())
                    .await?
            }
            WalletRequest::PageRequest { origin, payload } => self.page(origin, payload).await?,
            WalletRequest::GetDAppPermissionsRequest => {
                WalletResponse::GetDAppPermissionsResponse {
                    permissions: self.container.gateway.permissions(),
                }
            }
            WalletRequest::RevokeDAppPermissionRequest { origin } => {
                self.container.gateway.revoke(origin);
                WalletResponse::RevokeDAppPermissionResponse
            }
            WalletRequest::ConfirmRequest { .. }
            | WalletRequest::DAppPermissionConfirmRequest { .. }
            | WalletRequest::DAppOperationConfirmRequest { .. } => {
                return Err(WalletError::InvalidRequest(
                    "confirmation decisions are not handled here".into(),
                ))
            }
        };
        Ok(response)
    }

    /// Sign after the user approves. The password comes with the approval.
    async fn sign(
        &self,
        pkh: PublicKeyHash,
        bytes: String,
        watermark: Option<String>,
    ) -> WalletResult<WalletResponse> {
        let coordinator = Arc::clone(&self.container.coordinator);
        let session = Arc::clone(&self.container.session);
        self.container
            .store
            .with_ready(|_| async move {
                let payload = ConfirmationPayload::Sign {
                    account_public_key_hash: pkh.clone(),
                    bytes: bytes.clone(),
                    watermark: watermark.clone(),
                };
                let signed = coordinator
                    .create_confirmation(payload, move |approval| async move {
                        // A missing password is checked by the vault like a wrong one.
                        let password = approval
                            .password()
                            .cloned()
                            .unwrap_or_else(|| Password::new(""));
                        session
                            .sign(&pkh, &bytes, watermark.as_deref(), &password)
                            .await
                    })
                    .await?;
                Ok(WalletResponse::SignResponse { result: signed })
            })
            .await
    }

    async fn page(&self, origin: &str, payload: &PagePayload) -> WalletResult<WalletResponse> {
        let reply = match payload {
            PagePayload::DApp(raw) => {
                match self.container.gateway.process_raw(origin, raw).await {
                    Some(result) => Some(PageReply::DApp(result?)),
                    None => None,
                }
            }
            PagePayload::Beacon(wire) => Some(PageReply::Beacon(
                self.container.bridge.translate(origin, wire).await,
            )),
        };
        Ok(WalletResponse::PageResponse { payload: reply })
    }

    /// Whether a decision is for a confirmation that is still waiting.
    fn decision_pending(&self, id: &ConfirmationId, kind: ConfirmationKind) -> bool {
        self.container
            .coordinator
            .get(id)
            .is_some_and(|pending| pending.kind == kind)
    }
}

#[async_trait]
impl RequestHandler for BackgroundHandler {
    async fn handle(&self, id: MessageId, request: &WalletRequest) -> Option<BusReply> {
        // Live decisions go to the confirmation's own handler. Stale ones
        // are answered here so the sender is not left waiting.
        let decision = match request {
            WalletRequest::ConfirmRequest { id, .. } => Some((id, ConfirmationKind::Sign)),
            WalletRequest::DAppPermissionConfirmRequest { id, .. } => {
                Some((id, ConfirmationKind::DAppPermission))
            }
            WalletRequest::DAppOperationConfirmRequest { id, .. } => {
                Some((id, ConfirmationKind::DAppOperation))
            }
            _ => None,
        };
        if let Some((confirmation, kind)) = decision {
            if self.decision_pending(confirmation, kind) {
                return None;
            }
            warn!(%confirmation, %kind, "Decision for unknown or settled confirmation");
            return Some(Err(WalletError::InvalidRequest(format!(
                "Confirmation {confirmation} is not pending"
            ))));
        }

        debug!(%id, request = request.type_name(), "Handling request");
        let reply = self.process(request).await;
        if let Err(ref e) = reply {
            debug!(%id, request = request.type_name(), error = %e, "Request failed");
        }
        Some(reply)
    }
}
