//! # Protocol Bridge
//!
//! Turns a Beacon wire message into a gateway call and the result back into
//! a Beacon wire message. Never fails: every input gets a well-formed
//! response envelope.
//!
//! ## Translation
//!
//! ```text
//! wire ─► decode ─► scaffold {version, id, beaconId}
//!                      │
//!                      ├─ network.type == custom ──► NETWORK_NOT_SUPPORTED
//!                      ├─ permission_request ──────► handle_permission
//!                      ├─ operation_request ───────► handle_operation
//!                      └─ anything else ───────────► UNKNOWN_ERROR
//! ```

use crate::codec::{decode_message, encode_message};
use crate::config::BridgeConfig;
use crate::domain::{
    BeaconNetwork, BeaconRequest, BeaconResponse, BridgeFailure, ErrorType, RequestBody,
    ResponseBody, ResponseHeader,
};
use crate::formatter::{BeaconOpParamFormatter, OpParamFormatter};
use keyward_telemetry::{metric_inc, BRIDGE_TRANSLATIONS};
use kw_03_request_gateway::GatewayApi;
use serde_json::Value;
use shared_types::{AppMetadata, OperationRequest, PermissionRequest, PublicKeyHash};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Stateless Beacon adapter over the gateway.
pub struct ProtocolBridge {
    gateway: Arc<dyn GatewayApi>,
    formatter: Arc<dyn OpParamFormatter>,
    config: BridgeConfig,
}

impl ProtocolBridge {
    /// Bridge with the default operation formatter.
    pub fn new(gateway: Arc<dyn GatewayApi>, config: BridgeConfig) -> Self {
        Self::with_formatter(gateway, Arc::new(BeaconOpParamFormatter), config)
    }

    pub fn with_formatter(
        gateway: Arc<dyn GatewayApi>,
        formatter: Arc<dyn OpParamFormatter>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            gateway,
            formatter,
            config,
        }
    }

    /// Identity stamped on responses.
    #[must_use]
    pub fn bridge_id(&self) -> &str {
        &self.config.bridge_id
    }

    /// Translate one wire message from `origin` into the wire response.
    pub async fn translate(&self, origin: &str, wire: &str) -> String {
        let response = self.translate_wire(origin, wire).await;
        match encode_message(&response) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(error = %e, "Failed to encode bridge response");
                String::new()
            }
        }
    }

    /// Like [`translate`](Self::translate) but returns the response before
    /// encoding.
    pub async fn translate_wire(&self, origin: &str, wire: &str) -> BeaconResponse {
        match decode_message::<Value>(wire) {
            Ok(raw) => self.translate_value(origin, raw).await,
            Err(e) => {
                warn!(origin, error = %e, "Undecodable bridge message");
                self.finish(
                    self.scaffold(None),
                    Err(BridgeFailure::Protocol(ErrorType::ParametersInvalidError)),
                )
            }
        }
    }

    /// Translate an already decoded message.
    pub async fn translate_value(&self, origin: &str, raw: Value) -> BeaconResponse {
        let header = self.scaffold(Some(&raw));
        let outcome = self.dispatch(origin, raw).await;
        self.finish(header, outcome)
    }

    /// Response header with whatever `version` and `id` can be recovered.
    fn scaffold(&self, raw: Option<&Value>) -> ResponseHeader {
        let field = |name: &str| {
            raw.and_then(|r| r.get(name))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        ResponseHeader {
            version: field("version"),
            id: field("id"),
            bridge_id: self.config.bridge_id.clone(),
        }
    }

    async fn dispatch(&self, origin: &str, raw: Value) -> Result<ResponseBody, BridgeFailure> {
        let custom = raw
            .get("network")
            .and_then(|n| n.get("type"))
            .and_then(Value::as_str)
            == Some(BeaconNetwork::CUSTOM);
        if custom {
            return Err(BridgeFailure::Protocol(ErrorType::NetworkNotSupported));
        }

        let request: BeaconRequest = serde_json::from_value(raw).map_err(|e| {
            debug!(origin, error = %e, "Malformed bridge request");
            BridgeFailure::Protocol(ErrorType::ParametersInvalidError)
        })?;

        match request.body {
            RequestBody::PermissionRequest {
                app_metadata,
                network,
                ..
            } => {
                let request = PermissionRequest {
                    network: network.kind.clone(),
                    app_meta: AppMetadata {
                        name: app_metadata.name,
                        icon: app_metadata.icon,
                    },
                };
                let response = self.gateway.handle_permission(origin, request).await?;
                Ok(ResponseBody::PermissionResponse {
                    public_key: response.public_key,
                    network,
                    scopes: response.scopes,
                })
            }
            RequestBody::OperationRequest {
                operation_details,
                source_address,
                ..
            } => {
                let request = OperationRequest {
                    source_pkh: PublicKeyHash::new(source_address),
                    op_params: operation_details
                        .into_iter()
                        .map(|op| self.formatter.format(op))
                        .collect(),
                };
                let response = self.gateway.handle_operation(origin, request).await?;
                Ok(ResponseBody::OperationResponse {
                    transaction_hash: response.op_hash,
                })
            }
            RequestBody::SignPayloadRequest { .. } | RequestBody::BroadcastRequest { .. } => {
                debug!(origin, id = %request.header.id, "Unsupported bridge request type");
                Err(BridgeFailure::Protocol(ErrorType::UnknownError))
            }
        }
    }

    fn finish(
        &self,
        header: ResponseHeader,
        outcome: Result<ResponseBody, BridgeFailure>,
    ) -> BeaconResponse {
        let body = match outcome {
            Ok(body) => {
                metric_inc!(BRIDGE_TRANSLATIONS, &["success"]);
                body
            }
            Err(failure) => {
                let error_type = failure.error_type();
                debug!(id = %header.id, %error_type, failure = %failure, "Bridge request failed");
                metric_inc!(BRIDGE_TRANSLATIONS, &[error_type.as_str()]);
                ResponseBody::Error { error_type }
            }
        };
        BeaconResponse { header, body }
    }
}
