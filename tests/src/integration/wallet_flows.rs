//! # Wallet Flows
//!
//! Session lifecycle and signing through the bus:
//!
//! 1. New wallet, lock, unlock and the guards in between
//! 2. Sign: `SignRequest` → `ConfirmRequested` → `ConfirmRequest` → `SignResponse`
//! 3. Decline and deadline expiry, each closing the confirmation exactly once
//! 4. Serialized envelopes from a front-end connection

#[cfg(test)]
mod tests {
    use super::super::harness::{Harness, PASSWORD};
    use shared_types::{
        BusEnvelope, ConfirmationPayload, DeclineReason, EnvelopeBody, MessageId, Password,
        VaultError, WalletBroadcast, WalletError, WalletRequest, WalletResponse, WalletStatus,
    };
    use std::time::Duration;

    const BYTES: &str = "03a1b2c3";

    fn sign_request(pkh: &shared_types::PublicKeyHash) -> WalletRequest {
        WalletRequest::SignRequest {
            account_public_key_hash: pkh.clone(),
            bytes: BYTES.into(),
            watermark: None,
        }
    }

    // =========================================================================
    // SESSION LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_new_wallet_then_lock_and_unlock() {
        let mut harness = Harness::start().await;
        assert_eq!(harness.state().await.status, WalletStatus::Uninitialized);

        harness
            .ok(WalletRequest::NewWalletRequest {
                password: Password::new(PASSWORD),
                mnemonic: None,
            })
            .await;
        let state = harness.state().await;
        assert_eq!(state.status, WalletStatus::Ready);
        assert_eq!(state.accounts.len(), 1);

        assert_eq!(
            harness.ok(WalletRequest::LockRequest).await,
            WalletResponse::LockResponse
        );
        let locked = harness.state().await;
        assert_eq!(locked.status, WalletStatus::Locked);
        assert!(locked.accounts.is_empty());

        harness
            .ok(WalletRequest::UnlockRequest {
                password: Password::new(PASSWORD),
            })
            .await;
        assert_eq!(harness.state().await.status, WalletStatus::Ready);

        let updates = harness
            .broadcasts
            .drain()
            .into_iter()
            .filter(|m| *m == WalletBroadcast::StateUpdated)
            .count();
        assert_eq!(updates, 3, "new wallet, lock and unlock each publish");
    }

    #[tokio::test]
    async fn test_lock_when_locked_is_not_ready() {
        let harness = Harness::ready().await;
        harness.ok(WalletRequest::LockRequest).await;

        let err = harness.send(WalletRequest::LockRequest).await.unwrap_err();
        assert_eq!(err, WalletError::NotReady);
        assert_eq!(harness.state().await.status, WalletStatus::Locked);
    }

    #[tokio::test]
    async fn test_wrong_password_leaves_wallet_locked() {
        let harness = Harness::ready().await;
        harness.ok(WalletRequest::LockRequest).await;

        let err = harness
            .send(WalletRequest::UnlockRequest {
                password: Password::new("not it"),
            })
            .await
            .unwrap_err();
        assert_eq!(err, WalletError::Vault(VaultError::InvalidPassword));
        assert_eq!(harness.state().await.status, WalletStatus::Locked);
    }

    #[tokio::test]
    async fn test_second_wallet_refused() {
        let harness = Harness::ready().await;
        let err = harness
            .send(WalletRequest::NewWalletRequest {
                password: Password::new(PASSWORD),
                mnemonic: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, WalletError::AlreadyInitialized);
    }

    #[tokio::test]
    async fn test_invalid_account_name_rejected() {
        let harness = Harness::ready().await;
        let calls = harness.vault.call_count();

        let err = harness
            .send(WalletRequest::CreateAccountRequest {
                name: Some("My Wallet!".into()),
            })
            .await
            .unwrap_err();
        assert_eq!(err, WalletError::InvalidName);
        assert_eq!(harness.vault.call_count(), calls);
        assert_eq!(harness.state().await.accounts.len(), 1);

        harness
            .ok(WalletRequest::CreateAccountRequest {
                name: Some("Savings_2".into()),
            })
            .await;
        let accounts = harness.state().await.accounts;
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].name, "Savings_2");
    }

    #[tokio::test]
    async fn test_locked_wallet_is_not_ready_before_name_check() {
        let harness = Harness::ready().await;
        harness.ok(WalletRequest::LockRequest).await;
        let calls = harness.vault.call_count();

        let err = harness
            .send(WalletRequest::CreateAccountRequest {
                name: Some("My Wallet!".into()),
            })
            .await
            .unwrap_err();
        assert_eq!(err, WalletError::NotReady);
        assert_eq!(harness.vault.call_count(), calls);
    }

    #[tokio::test]
    async fn test_sign_requires_ready() {
        let mut harness = Harness::ready().await;
        let pkh = harness.first_account().await;
        harness.ok(WalletRequest::LockRequest).await;
        harness.broadcasts.drain();

        let err = harness.send(sign_request(&pkh)).await.unwrap_err();
        assert_eq!(err, WalletError::NotReady);
        assert!(
            harness.broadcasts.drain().is_empty(),
            "no confirmation is opened for a locked wallet"
        );
    }

    // =========================================================================
    // SIGN CONFIRMATION
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_sign_approved() {
        let mut harness = Harness::ready().await;
        let pkh = harness.first_account().await;

        let pending = harness.spawn(sign_request(&pkh));
        let (id, payload) = harness.next_confirmation().await;
        assert_eq!(
            payload,
            ConfirmationPayload::Sign {
                account_public_key_hash: pkh.clone(),
                bytes: BYTES.into(),
                watermark: None,
            }
        );

        let ack = harness
            .ok(WalletRequest::ConfirmRequest {
                id,
                confirm: true,
                password: Some(Password::new(PASSWORD)),
            })
            .await;
        assert_eq!(ack, WalletResponse::ConfirmResponse { id });

        match pending.await.unwrap().unwrap() {
            Ok(WalletResponse::SignResponse { result }) => {
                assert_eq!(result.bytes, BYTES);
                assert!(result.signature.starts_with("edsig"));
                assert!(result.signed_bytes.starts_with(BYTES));
            }
            other => panic!("unexpected reply: {other:?}"),
        }
        assert_eq!(harness.expired(), vec![id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_declined() {
        let mut harness = Harness::ready().await;
        let pkh = harness.first_account().await;

        let pending = harness.spawn(sign_request(&pkh));
        let (id, _) = harness.next_confirmation().await;
        let calls = harness.vault.call_count();
        harness
            .ok(WalletRequest::ConfirmRequest {
                id,
                confirm: false,
                password: None,
            })
            .await;

        let reply = pending.await.unwrap().unwrap();
        assert_eq!(reply, Err(WalletError::Declined(DeclineReason::Explicit)));
        assert_eq!(harness.expired(), vec![id]);
        assert_eq!(harness.vault.call_count(), calls, "declining never signs");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_wrong_password_after_approval() {
        let mut harness = Harness::ready().await;
        let pkh = harness.first_account().await;

        let pending = harness.spawn(sign_request(&pkh));
        let (id, _) = harness.next_confirmation().await;
        let decision = harness
            .send(WalletRequest::ConfirmRequest {
                id,
                confirm: true,
                password: Some(Password::new("wrong")),
            })
            .await;
        assert_eq!(decision, Err(WalletError::Vault(VaultError::InvalidPassword)));

        let reply = pending.await.unwrap().unwrap();
        assert_eq!(reply, Err(WalletError::Vault(VaultError::InvalidPassword)));
        assert_eq!(harness.expired(), vec![id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_times_out_once() {
        let mut harness = Harness::ready().await;
        let pkh = harness.first_account().await;

        let pending = harness.spawn(sign_request(&pkh));
        let (id, _) = harness.next_confirmation().await;

        let reply = pending.await.unwrap().unwrap();
        assert_eq!(reply, Err(WalletError::Declined(DeclineReason::Timeout)));
        assert_eq!(harness.expired(), vec![id]);

        // Late decision: nobody is waiting for it any more.
        let late = harness
            .send(WalletRequest::ConfirmRequest {
                id,
                confirm: true,
                password: Some(Password::new(PASSWORD)),
            })
            .await;
        assert!(matches!(late, Err(WalletError::InvalidRequest(_))));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(harness.expired().is_empty(), "expiry is broadcast only once");
        assert_eq!(harness.runtime.container().coordinator.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_runtime_uses_fixed_confirmation_deadline() {
        let harness = Harness::start().await;
        assert_eq!(
            harness.runtime.container().coordinator.config().timeout,
            Duration::from_secs(60)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_decision_of_wrong_kind_is_refused() {
        let mut harness = Harness::ready().await;
        let pkh = harness.first_account().await;

        let pending = harness.spawn(sign_request(&pkh));
        let (id, _) = harness.next_confirmation().await;

        let wrong = harness
            .send(WalletRequest::DAppOperationConfirmRequest {
                id,
                confirm: true,
                password: Some(Password::new(PASSWORD)),
            })
            .await;
        assert!(matches!(wrong, Err(WalletError::InvalidRequest(_))));
        assert!(harness.runtime.container().coordinator.is_pending(&id));

        harness
            .ok(WalletRequest::ConfirmRequest {
                id,
                confirm: true,
                password: Some(Password::new(PASSWORD)),
            })
            .await;
        assert!(matches!(
            pending.await.unwrap().unwrap(),
            Ok(WalletResponse::SignResponse { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_confirmations_are_independent() {
        let mut harness = Harness::ready().await;
        let pkh = harness.first_account().await;

        let first = harness.spawn(sign_request(&pkh));
        let (first_id, _) = harness.next_confirmation().await;
        let second = harness.spawn(sign_request(&pkh));
        let (second_id, _) = harness.next_confirmation().await;
        assert_ne!(first_id, second_id);

        harness
            .ok(WalletRequest::ConfirmRequest {
                id: second_id,
                confirm: false,
                password: None,
            })
            .await;
        harness
            .ok(WalletRequest::ConfirmRequest {
                id: first_id,
                confirm: true,
                password: Some(Password::new(PASSWORD)),
            })
            .await;

        assert!(matches!(
            first.await.unwrap().unwrap(),
            Ok(WalletResponse::SignResponse { .. })
        ));
        assert_eq!(
            second.await.unwrap().unwrap(),
            Err(WalletError::Declined(DeclineReason::Explicit))
        );
    }

    // =========================================================================
    // FRONT-END CONNECTION
    // =========================================================================

    #[tokio::test]
    async fn test_frontend_envelopes() {
        let harness = Harness::ready().await;
        let (frontend, mut outbound) = harness.runtime.connect_frontend();

        let id = MessageId::new();
        let request =
            serde_json::to_string(&BusEnvelope::request(id, WalletRequest::LockRequest)).unwrap();
        let reply: BusEnvelope =
            serde_json::from_str(&frontend.handle_incoming(&request).await).unwrap();
        match reply.body {
            EnvelopeBody::Response { id: reply_id, result } => {
                assert_eq!(reply_id, id);
                assert_eq!(result, Ok(WalletResponse::LockResponse));
            }
            other => panic!("unexpected envelope: {other:?}"),
        }

        let pushed: BusEnvelope = serde_json::from_str(&outbound.recv().await.unwrap()).unwrap();
        assert!(matches!(
            pushed.body,
            EnvelopeBody::Broadcast {
                message: WalletBroadcast::StateUpdated
            }
        ));

        let malformed: BusEnvelope =
            serde_json::from_str(&frontend.handle_incoming("[1, 2").await).unwrap();
        assert!(matches!(
            malformed.body,
            EnvelopeBody::Response {
                result: Err(WalletError::InvalidRequest(_)),
                ..
            }
        ));
    }
}
