//! # dApp Flows
//!
//! Page traffic through `PageRequest`, both native and Beacon:
//!
//! 1. **Permission**: request → `ConfirmRequested` → user picks an account → grant
//! 2. **Operation**: granted origin → `ConfirmRequested` → approval → op hash
//! 3. **Beacon**: the same flows behind Base58Check-encoded wire messages

#[cfg(test)]
mod tests {
    use super::super::harness::{Harness, OP_HASH, PASSWORD};
    use kw_03_request_gateway::GatewayApi;
    use kw_04_protocol_bridge::{decode_message, encode_message};
    use serde_json::{json, Value};
    use shared_types::{
        ConfirmationPayload, DAppError, DAppErrorKind, DAppResponse, PagePayload, PageReply,
        Password, PublicKeyHash, VaultError, WalletError, WalletRequest, WalletResponse,
        WalletStatus,
    };
    use tokio::task::JoinHandle;

    const ORIGIN: &str = "https://dex.example";

    fn page(payload: PagePayload) -> WalletRequest {
        WalletRequest::PageRequest {
            origin: ORIGIN.into(),
            payload,
        }
    }

    fn dapp_permission() -> WalletRequest {
        page(PagePayload::DApp(json!({
            "type": "PermissionRequest",
            "network": "mainnet",
            "appMeta": { "name": "Dex" }
        })))
    }

    fn dapp_operation(source: &PublicKeyHash) -> WalletRequest {
        page(PagePayload::DApp(json!({
            "type": "OperationRequest",
            "sourcePkh": source,
            "opParams": [{ "kind": "transaction", "to": "KT1abc", "amount": 10 }]
        })))
    }

    fn beacon(message: Value) -> WalletRequest {
        page(PagePayload::Beacon(encode_message(&message).unwrap()))
    }

    fn beacon_permission(network: Value) -> WalletRequest {
        beacon(json!({
            "type": "permission_request",
            "version": "2",
            "id": "req-1",
            "senderId": "peer",
            "appMetadata": { "senderId": "peer", "name": "Dex" },
            "network": network,
            "scopes": ["operation_request"]
        }))
    }

    fn beacon_operation(source: &PublicKeyHash) -> WalletRequest {
        beacon(json!({
            "type": "operation_request",
            "version": "2",
            "id": "req-2",
            "senderId": "peer",
            "network": { "type": "mainnet" },
            "operationDetails": [
                { "kind": "transaction", "destination": "KT1abc", "amount": "10" }
            ],
            "sourceAddress": source
        }))
    }

    type PendingReply = JoinHandle<Result<Result<WalletResponse, WalletError>, shared_bus::BusError>>;

    async fn page_reply(pending: PendingReply) -> Result<Option<PageReply>, WalletError> {
        match pending.await.unwrap().unwrap()? {
            WalletResponse::PageResponse { payload } => Ok(payload),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    fn beacon_reply(reply: Option<PageReply>) -> Value {
        match reply {
            Some(PageReply::Beacon(wire)) => decode_message(&wire).unwrap(),
            other => panic!("expected a Beacon reply, got {other:?}"),
        }
    }

    /// Approve the next permission confirmation with the first account.
    async fn grant(harness: &mut Harness) -> PublicKeyHash {
        let pkh = harness.first_account().await;
        let public_key = harness.public_key(&pkh).await;
        let (id, payload) = harness.next_confirmation().await;
        assert!(matches!(
            payload,
            ConfirmationPayload::DAppPermission { ref origin, .. } if origin == ORIGIN
        ));
        harness
            .ok(WalletRequest::DAppPermissionConfirmRequest {
                id,
                confirm: true,
                pkh: Some(pkh.clone()),
                public_key: Some(public_key),
            })
            .await;
        pkh
    }

    async fn approve_operation(harness: &mut Harness) {
        let (id, payload) = harness.next_confirmation().await;
        assert!(matches!(payload, ConfirmationPayload::DAppOperation { .. }));
        let ack = harness
            .ok(WalletRequest::DAppOperationConfirmRequest {
                id,
                confirm: true,
                password: Some(Password::new(PASSWORD)),
            })
            .await;
        assert_eq!(ack, WalletResponse::DAppOperationConfirmResponse { id });
    }

    // =========================================================================
    // NATIVE dApp
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_permission_then_operation() {
        let mut harness = Harness::ready().await;

        let pending = harness.spawn(dapp_permission());
        let pkh = grant(&mut harness).await;
        match page_reply(pending).await.unwrap() {
            Some(PageReply::DApp(DAppResponse::PermissionResponse(granted))) => {
                assert_eq!(granted.pkh, pkh);
                assert_eq!(granted.network, "mainnet");
                assert!(granted.public_key.starts_with("edpk"));
            }
            other => panic!("unexpected reply: {other:?}"),
        }

        let permissions = match harness.ok(WalletRequest::GetDAppPermissionsRequest).await {
            WalletResponse::GetDAppPermissionsResponse { permissions } => permissions,
            other => panic!("unexpected response: {other:?}"),
        };
        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions[0].origin, ORIGIN);

        let pending = harness.spawn(dapp_operation(&pkh));
        approve_operation(&mut harness).await;
        match page_reply(pending).await.unwrap() {
            Some(PageReply::DApp(DAppResponse::OperationResponse(op))) => {
                assert_eq!(op.op_hash, OP_HASH)
            }
            other => panic!("unexpected reply: {other:?}"),
        }
        assert_eq!(harness.sender.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_permission_reuses_grant() {
        let mut harness = Harness::ready().await;

        let pending = harness.spawn(dapp_permission());
        grant(&mut harness).await;
        page_reply(pending).await.unwrap();
        harness.broadcasts.drain();

        // Same origin, network and app: no second prompt.
        let reply = harness.send(dapp_permission()).await.unwrap();
        assert!(matches!(
            reply,
            WalletResponse::PageResponse {
                payload: Some(PageReply::DApp(DAppResponse::PermissionResponse(_)))
            }
        ));
        assert_eq!(harness.runtime.container().coordinator.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_without_grant_is_refused() {
        let harness = Harness::ready().await;
        let pkh = harness.first_account().await;

        let err = harness.send(dapp_operation(&pkh)).await.unwrap_err();
        assert!(matches!(
            err,
            WalletError::DApp(DAppError {
                kind: DAppErrorKind::NotGranted,
                ..
            })
        ));
        assert!(harness.sender.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoked_origin_loses_grant() {
        let mut harness = Harness::ready().await;
        let pending = harness.spawn(dapp_permission());
        let pkh = grant(&mut harness).await;
        page_reply(pending).await.unwrap();

        harness
            .ok(WalletRequest::RevokeDAppPermissionRequest {
                origin: ORIGIN.into(),
            })
            .await;
        let err = harness.send(dapp_operation(&pkh)).await.unwrap_err();
        assert!(matches!(
            err,
            WalletError::DApp(DAppError {
                kind: DAppErrorKind::NotGranted,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_permission_is_not_granted() {
        let mut harness = Harness::ready().await;

        let pending = harness.spawn(dapp_permission());
        let (id, _) = harness.next_confirmation().await;
        harness
            .ok(WalletRequest::DAppPermissionConfirmRequest {
                id,
                confirm: false,
                pkh: None,
                public_key: None,
            })
            .await;

        let err = page_reply(pending).await.unwrap_err();
        assert!(matches!(
            err,
            WalletError::DApp(DAppError {
                kind: DAppErrorKind::NotGranted,
                ..
            })
        ));
        assert!(harness.runtime.container().gateway.permissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_approved_while_locked_grants_nothing() {
        let mut harness = Harness::ready().await;

        let pending = harness.spawn(dapp_permission());
        let (id, _) = harness.next_confirmation().await;
        harness.ok(WalletRequest::LockRequest).await;

        let decision = harness
            .send(WalletRequest::DAppPermissionConfirmRequest {
                id,
                confirm: true,
                pkh: Some(PublicKeyHash::new("tz1NOTINWALLET")),
                public_key: Some("edpkFORGED".into()),
            })
            .await;
        assert_eq!(decision, Err(WalletError::NotReady));
        assert_eq!(page_reply(pending).await.unwrap_err(), WalletError::NotReady);
        assert!(harness.runtime.container().gateway.permissions().is_empty());
        assert_eq!(harness.state().await.status, WalletStatus::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_for_foreign_account_is_refused() {
        let mut harness = Harness::ready().await;

        let pending = harness.spawn(dapp_permission());
        let (id, _) = harness.next_confirmation().await;
        let foreign = PublicKeyHash::new("tz1NOTINWALLET");
        let decision = harness
            .send(WalletRequest::DAppPermissionConfirmRequest {
                id,
                confirm: true,
                pkh: Some(foreign.clone()),
                public_key: Some("edpkFORGED".into()),
            })
            .await;
        let expected = WalletError::Vault(VaultError::AccountNotFound(foreign));
        assert_eq!(decision, Err(expected.clone()));
        assert_eq!(page_reply(pending).await.unwrap_err(), expected);
        assert!(harness.runtime.container().gateway.permissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_approved_while_locked_is_not_sent() {
        let mut harness = Harness::ready().await;
        let pending = harness.spawn(dapp_permission());
        let pkh = grant(&mut harness).await;
        page_reply(pending).await.unwrap();

        let pending = harness.spawn(dapp_operation(&pkh));
        let (id, _) = harness.next_confirmation().await;
        harness.ok(WalletRequest::LockRequest).await;

        let decision = harness
            .send(WalletRequest::DAppOperationConfirmRequest {
                id,
                confirm: true,
                password: None,
            })
            .await;
        assert_eq!(decision, Err(WalletError::NotReady));
        assert_eq!(page_reply(pending).await.unwrap_err(), WalletError::NotReady);
        assert!(harness.sender.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_without_password_is_not_sent() {
        let mut harness = Harness::ready().await;
        let pending = harness.spawn(dapp_permission());
        let pkh = grant(&mut harness).await;
        page_reply(pending).await.unwrap();

        let pending = harness.spawn(dapp_operation(&pkh));
        let (id, _) = harness.next_confirmation().await;
        let decision = harness
            .send(WalletRequest::DAppOperationConfirmRequest {
                id,
                confirm: true,
                password: None,
            })
            .await;
        let invalid = WalletError::Vault(VaultError::InvalidPassword);
        assert_eq!(decision, Err(invalid.clone()));
        assert_eq!(page_reply(pending).await.unwrap_err(), invalid);
        assert!(harness.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_dapp_request_needs_initialized_wallet() {
        let harness = Harness::start().await;
        let err = harness.send(dapp_permission()).await.unwrap_err();
        assert_eq!(err, WalletError::NotInitialized);
    }

    #[tokio::test]
    async fn test_unknown_dapp_message_gets_no_reply() {
        let harness = Harness::ready().await;
        let reply = harness
            .ok(page(PagePayload::DApp(json!({ "type": "Ping" }))))
            .await;
        assert_eq!(reply, WalletResponse::PageResponse { payload: None });
    }

    // =========================================================================
    // BEACON
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_beacon_permission_then_operation() {
        let mut harness = Harness::ready().await;

        let pending = harness.spawn(beacon_permission(json!({ "type": "mainnet" })));
        let pkh = grant(&mut harness).await;
        let permission = beacon_reply(page_reply(pending).await.unwrap());
        assert_eq!(permission["type"], "permission_response");
        assert_eq!(permission["id"], "req-1");
        assert_eq!(permission["network"], json!({ "type": "mainnet" }));
        assert_eq!(permission["scopes"], json!(["operation_request"]));

        let pending = harness.spawn(beacon_operation(&pkh));
        approve_operation(&mut harness).await;
        let operation = beacon_reply(page_reply(pending).await.unwrap());
        assert_eq!(operation["type"], "operation_response");
        assert_eq!(operation["id"], "req-2");
        assert_eq!(operation["transactionHash"], OP_HASH);

        let sent = harness.sender.sent();
        assert_eq!(sent[0].op_params[0]["to"], "KT1abc");
        assert_eq!(sent[0].op_params[0]["amount"], 10);
    }

    #[tokio::test]
    async fn test_beacon_custom_network_not_supported() {
        let harness = Harness::ready().await;
        let reply = harness
            .send(beacon_permission(
                json!({ "type": "custom", "rpcUrl": "http://localhost:8732" }),
            ))
            .await
            .unwrap();
        let message = match reply {
            WalletResponse::PageResponse { payload } => beacon_reply(payload),
            other => panic!("unexpected response: {other:?}"),
        };
        assert_eq!(message["type"], "error");
        assert_eq!(message["errorType"], "NETWORK_NOT_SUPPORTED");
        assert_eq!(message["id"], "req-1");
        assert_eq!(harness.runtime.container().coordinator.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_beacon_operation_without_grant_is_an_error_message() {
        let harness = Harness::ready().await;
        let pkh = harness.first_account().await;
        let reply = harness.send(beacon_operation(&pkh)).await.unwrap();
        let message = match reply {
            WalletResponse::PageResponse { payload } => beacon_reply(payload),
            other => panic!("unexpected response: {other:?}"),
        };
        assert_eq!(message["type"], "error");
        assert_eq!(message["errorType"], "NOT_GRANTED_ERROR");
    }
}
