//! # Bus Message Payloads
//!
//! Every request, response and broadcast exchanged between the privileged
//! background context and the front-end contexts.
//!
//! ## Design Rules
//!
//! - Request/response pairs share a stem (`UnlockRequest` / `UnlockResponse`).
//! - Correlation is by the envelope's `MessageId`, never by arrival order.
//! - Broadcasts carry no correlation and go to every subscriber.

use crate::correlation::ConfirmationId;
use crate::dapp::{AppMetadata, DAppResponse, DAppSession};
use crate::entities::{PublicKeyHash, Settings, WalletState};
use crate::secret::{Password, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// REQUESTS
// =============================================================================

/// Request sent to the background context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum WalletRequest {
    GetStateRequest,
    NewWalletRequest {
        password: Password,
        #[serde(default)]
        mnemonic: Option<SecretString>,
    },
    UnlockRequest {
        password: Password,
    },
    LockRequest,
    CreateAccountRequest {
        #[serde(default)]
        name: Option<String>,
    },
    RevealPrivateKeyRequest {
        account_public_key_hash: PublicKeyHash,
        password: Password,
    },
    RevealMnemonicRequest {
        password: Password,
    },
    RevealPublicKeyRequest {
        account_public_key_hash: PublicKeyHash,
    },
    RemoveAccountRequest {
        account_public_key_hash: PublicKeyHash,
        password: Password,
    },
    EditAccountRequest {
        account_public_key_hash: PublicKeyHash,
        name: String,
    },
    ImportAccountRequest {
        private_key: SecretString,
        #[serde(default)]
        enc_password: Option<Password>,
    },
    ImportMnemonicAccountRequest {
        mnemonic: SecretString,
        #[serde(default)]
        password: Option<Password>,
        #[serde(default)]
        derivation_path: Option<String>,
    },
    ImportFundraiserAccountRequest {
        email: String,
        password: Password,
        mnemonic: SecretString,
    },
    UpdateSettingsRequest {
        settings: Settings,
    },
    SignRequest {
        account_public_key_hash: PublicKeyHash,
        bytes: String,
        #[serde(default)]
        watermark: Option<String>,
    },
    ConfirmRequest {
        id: ConfirmationId,
        confirm: bool,
        #[serde(default)]
        password: Option<Password>,
    },
    DAppPermissionConfirmRequest {
        id: ConfirmationId,
        confirm: bool,
        #[serde(default)]
        pkh: Option<PublicKeyHash>,
        #[serde(default)]
        public_key: Option<String>,
    },
    DAppOperationConfirmRequest {
        id: ConfirmationId,
        confirm: bool,
        #[serde(default)]
        password: Option<Password>,
    },
    PageRequest {
        origin: String,
        payload: PagePayload,
    },
    GetDAppPermissionsRequest,
    RevokeDAppPermissionRequest {
        origin: String,
    },
}

impl WalletRequest {
    /// Wire tag, for logging. Never includes secret fields.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            WalletRequest::GetStateRequest => "GetStateRequest",
            WalletRequest::NewWalletRequest { .. } => "NewWalletRequest",
            WalletRequest::UnlockRequest { .. } => "UnlockRequest",
            WalletRequest::LockRequest => "LockRequest",
            WalletRequest::CreateAccountRequest { .. } => "CreateAccountRequest",
            WalletRequest::RevealPrivateKeyRequest { .. } => "RevealPrivateKeyRequest",
            WalletRequest::RevealMnemonicRequest { .. } => "RevealMnemonicRequest",
            WalletRequest::RevealPublicKeyRequest { .. } => "RevealPublicKeyRequest",
            WalletRequest::RemoveAccountRequest { .. } => "RemoveAccountRequest",
            WalletRequest::EditAccountRequest { .. } => "EditAccountRequest",
            WalletRequest::ImportAccountRequest { .. } => "ImportAccountRequest",
            WalletRequest::ImportMnemonicAccountRequest { .. } => "ImportMnemonicAccountRequest",
            WalletRequest::ImportFundraiserAccountRequest { .. } => {
                "ImportFundraiserAccountRequest"
            }
            WalletRequest::UpdateSettingsRequest { .. } => "UpdateSettingsRequest",
            WalletRequest::SignRequest { .. } => "SignRequest",
            WalletRequest::ConfirmRequest { .. } => "ConfirmRequest",
            WalletRequest::DAppPermissionConfirmRequest { .. } => "DAppPermissionConfirmRequest",
            WalletRequest::DAppOperationConfirmRequest { .. } => "DAppOperationConfirmRequest",
            WalletRequest::PageRequest { .. } => "PageRequest",
            WalletRequest::GetDAppPermissionsRequest => "GetDAppPermissionsRequest",
            WalletRequest::RevokeDAppPermissionRequest { .. } => "RevokeDAppPermissionRequest",
        }
    }
}

/// Traffic forwarded from a web page by the content script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum PagePayload {
    /// Native dApp request (raw JSON; the Gateway decodes it).
    DApp(serde_json::Value),
    /// Beacon wire message (Base58Check-encoded JSON).
    Beacon(String),
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Signature produced by the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPayload {
    /// Bytes that were signed (hex).
    pub bytes: String,
    /// Encoded signature.
    pub signature: String,
    /// `bytes` with the raw signature appended (hex).
    pub signed_bytes: String,
}

/// Successful response from the background context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum WalletResponse {
    GetStateResponse { state: WalletState },
    NewWalletResponse,
    UnlockResponse,
    LockResponse,
    CreateAccountResponse,
    RevealPrivateKeyResponse { private_key: SecretString },
    RevealMnemonicResponse { mnemonic: SecretString },
    RevealPublicKeyResponse { public_key: String },
    RemoveAccountResponse,
    EditAccountResponse,
    ImportAccountResponse,
    ImportMnemonicAccountResponse,
    ImportFundraiserAccountResponse,
    UpdateSettingsResponse,
    SignResponse { result: SignedPayload },
    ConfirmResponse { id: ConfirmationId },
    DAppPermissionConfirmResponse { id: ConfirmationId },
    DAppOperationConfirmResponse { id: ConfirmationId },
    PageResponse { payload: Option<PageReply> },
    GetDAppPermissionsResponse { permissions: Vec<DAppSession> },
    RevokeDAppPermissionResponse,
}

/// Reply forwarded back to a web page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum PageReply {
    /// Native dApp response.
    DApp(DAppResponse),
    /// Beacon wire response (Base58Check-encoded JSON).
    Beacon(String),
}

// =============================================================================
// BROADCASTS
// =============================================================================

/// What a pending confirmation asks the user to approve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmationKind {
    /// Sign bytes with an account key.
    Sign,
    /// Expose an account to an origin.
    DAppPermission,
    /// Sign and broadcast operations for an origin.
    DAppOperation,
}

impl fmt::Display for ConfirmationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfirmationKind::Sign => "sign",
            ConfirmationKind::DAppPermission => "dapp_permission",
            ConfirmationKind::DAppOperation => "dapp_operation",
        };
        f.write_str(s)
    }
}

/// Data the confirmation UI displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum ConfirmationPayload {
    Sign {
        account_public_key_hash: PublicKeyHash,
        bytes: String,
        watermark: Option<String>,
    },
    DAppPermission {
        origin: String,
        network: String,
        app_meta: AppMetadata,
    },
    DAppOperation {
        origin: String,
        source_pkh: PublicKeyHash,
        op_params: Vec<serde_json::Value>,
    },
}

impl ConfirmationPayload {
    /// Confirmation kind this payload belongs to.
    #[must_use]
    pub fn kind(&self) -> ConfirmationKind {
        match self {
            ConfirmationPayload::Sign { .. } => ConfirmationKind::Sign,
            ConfirmationPayload::DAppPermission { .. } => ConfirmationKind::DAppPermission,
            ConfirmationPayload::DAppOperation { .. } => ConfirmationKind::DAppOperation,
        }
    }
}

/// Notification delivered to every subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WalletBroadcast {
    /// The session snapshot changed; front-ends re-fetch state.
    StateUpdated,
    /// A confirmation is waiting for a decision.
    ConfirmRequested {
        id: ConfirmationId,
        payload: ConfirmationPayload,
    },
    /// A confirmation is no longer pending.
    ConfirmExpired { id: ConfirmationId },
}
