//! # Request Gateway Service
//!
//! Validates page requests, checks that a wallet exists, and hands them to
//! the consent provider with the origin attached.

use crate::domain::{validate_operation, validate_origin, validate_permission};
use crate::ports::{ConsentProvider, GatewayApi};
use async_trait::async_trait;
use kw_01_session_store::SessionStore;
use serde_json::Value;
use shared_types::{
    DAppError, DAppRequest, DAppResponse, DAppSession, OperationRequest, OperationResponse,
    PermissionRequest, PermissionResponse, WalletResult,
};
use std::sync::Arc;
use tracing::debug;

/// Gateway implementation.
pub struct RequestGateway {
    store: Arc<SessionStore>,
    consent: Arc<dyn ConsentProvider>,
}

impl RequestGateway {
    pub fn new(store: Arc<SessionStore>, consent: Arc<dyn ConsentProvider>) -> Self {
        Self { store, consent }
    }
}

#[async_trait]
impl GatewayApi for RequestGateway {
    async fn handle_permission(
        &self,
        origin: &str,
        request: PermissionRequest,
    ) -> WalletResult<PermissionResponse> {
        self.store
            .with_initialized(|| async move {
                validate_origin(origin)?;
                validate_permission(&request)?;
                debug!(origin, network = %request.network, "Permission request");
                self.consent.request_permission(origin, request).await
            })
            .await
    }

    async fn handle_operation(
        &self,
        origin: &str,
        request: OperationRequest,
    ) -> WalletResult<OperationResponse> {
        self.store
            .with_initialized(|| async move {
                validate_origin(origin)?;
                validate_operation(&request)?;
                debug!(origin, ops = request.op_params.len(), "Operation request");
                self.consent.request_operation(origin, request).await
            })
            .await
    }

    async fn process_raw(&self, origin: &str, raw: &Value) -> Option<WalletResult<DAppResponse>> {
        let tag = raw.get("type").and_then(Value::as_str);
        if !tag.is_some_and(|t| DAppRequest::TAGS.contains(&t)) {
            debug!(origin, tag = ?tag, "Ignoring page message with unknown type");
            return None;
        }

        let request: DAppRequest = match serde_json::from_value(raw.clone()) {
            Ok(request) => request,
            Err(e) => return Some(Err(DAppError::invalid_params(e.to_string()).into())),
        };

        let response = match request {
            DAppRequest::PermissionRequest(req) => self
                .handle_permission(origin, req)
                .await
                .map(DAppResponse::PermissionResponse),
            DAppRequest::OperationRequest(req) => self
                .handle_operation(origin, req)
                .await
                .map(DAppResponse::OperationResponse),
        };
        Some(response)
    }

    fn revoke(&self, origin: &str) -> bool {
        self.consent.revoke(origin)
    }

    fn permissions(&self) -> Vec<DAppSession> {
        self.consent.grants()
    }
}
