//! Beacon envelopes.
//!
//! Every message carries `version` and `id`. Requests add the peer's
//! `senderId`; responses add the bridge identity as `beaconId`.

use super::error::ErrorType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::DAppScope;

/// Network a peer wants to use. `type` is `mainnet`, a testnet name or
/// `custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconNetwork {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
}

impl BeaconNetwork {
    pub const CUSTOM: &'static str = "custom";

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.kind == Self::CUSTOM
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconAppMetadata {
    #[serde(default)]
    pub sender_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHeader {
    pub version: String,
    pub id: String,
    #[serde(default)]
    pub sender_id: String,
}

/// Incoming request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconRequest {
    #[serde(flatten)]
    pub header: RequestHeader,
    #[serde(flatten)]
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RequestBody {
    PermissionRequest {
        app_metadata: BeaconAppMetadata,
        network: BeaconNetwork,
        #[serde(default)]
        scopes: Vec<String>,
    },
    OperationRequest {
        network: BeaconNetwork,
        operation_details: Vec<Value>,
        source_address: String,
    },
    SignPayloadRequest {
        #[serde(default)]
        payload: String,
        #[serde(default)]
        source_address: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        network: Option<BeaconNetwork>,
    },
    BroadcastRequest {
        network: BeaconNetwork,
        #[serde(default)]
        signed_transaction: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeader {
    pub version: String,
    pub id: String,
    #[serde(rename = "beaconId", alias = "bridgeId")]
    pub bridge_id: String,
}

/// Outgoing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconResponse {
    #[serde(flatten)]
    pub header: ResponseHeader,
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl BeaconResponse {
    /// Error type, for error responses.
    #[must_use]
    pub fn error_type(&self) -> Option<ErrorType> {
        match self.body {
            ResponseBody::Error { error_type } => Some(error_type),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ResponseBody {
    PermissionResponse {
        public_key: String,
        network: BeaconNetwork,
        scopes: Vec<DAppScope>,
    },
    OperationResponse {
        transaction_hash: String,
    },
    Error {
        error_type: ErrorType,
    },
}

impl ResponseBody {
    /// Wire `type` of this body.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            ResponseBody::PermissionResponse { .. } => "permission_response",
            ResponseBody::OperationResponse { .. } => "operation_response",
            ResponseBody::Error { .. } => "error",
        }
    }
}
