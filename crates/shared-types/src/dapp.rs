//! # dApp Request Types
//!
//! Requests a web page may send through the content-script channel, and the
//! responses the Request Gateway produces for them.

use crate::entities::PublicKeyHash;
use serde::{Deserialize, Serialize};

/// Application metadata supplied by the requesting page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Display name of the application.
    pub name: String,
    /// Optional icon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Capability granted to an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DAppScope {
    /// May request operations to be signed and broadcast.
    OperationRequest,
}

/// Ask for an account to be exposed to the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    /// Network the application wants to use.
    pub network: String,
    /// Application metadata.
    pub app_meta: AppMetadata,
}

/// Permission granted to the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    /// Granted account.
    pub pkh: PublicKeyHash,
    /// Public key of the granted account.
    pub public_key: String,
    /// Network the grant applies to.
    pub network: String,
    /// Granted scopes.
    pub scopes: Vec<DAppScope>,
}

/// Ask for operations to be signed and broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    /// Account that signs the operations.
    pub source_pkh: PublicKeyHash,
    /// Operation parameters, opaque to the core.
    pub op_params: Vec<serde_json::Value>,
}

/// Result of a broadcast operation group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    /// Hash of the injected operation group.
    pub op_hash: String,
}

/// dApp request, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DAppRequest {
    /// Permission grant.
    PermissionRequest(PermissionRequest),
    /// Operation authorization.
    OperationRequest(OperationRequest),
}

impl DAppRequest {
    /// Wire tags of every supported request.
    pub const TAGS: [&'static str; 2] = ["PermissionRequest", "OperationRequest"];
}

/// dApp response, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DAppResponse {
    /// Permission granted.
    PermissionResponse(PermissionResponse),
    /// Operations broadcast.
    OperationResponse(OperationResponse),
}

/// A permission held by an origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DAppSession {
    /// Origin the grant is scoped to.
    pub origin: String,
    /// Network of the grant.
    pub network: String,
    /// Application metadata at grant time.
    pub app_meta: AppMetadata,
    /// Granted account.
    pub pkh: PublicKeyHash,
    /// Public key of the granted account.
    pub public_key: String,
}
