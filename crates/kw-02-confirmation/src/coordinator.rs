//! # Confirmation Coordinator
//!
//! Publishes a confirmation, waits for exactly one decision or the deadline,
//! and runs the guarded action only on approval.
//!
//! ## Lifecycle
//!
//! ```text
//! create ──► register handler ──► ConfirmRequested ──► start timer
//!                                                          │
//!              ┌────────────── first of ───────────────────┤
//!              ▼                     ▼                     ▼
//!          approve               decline               deadline
//!        run action          Declined(Explicit)   Declined(Timeout)
//!              └─────────────────────┴─────────────────────┘
//!                                    ▼
//!        unregister, stop timer, ConfirmExpired, drop pending entry
//! ```
//!
//! Settlement is claimed with a single compare-and-swap, so a decision and
//! the deadline landing together still produce one outcome. Once the approve
//! branch has claimed it, the deadline no longer applies.

use crate::config::ConfirmationConfig;
use crate::domain::approval::acknowledgement;
use crate::domain::{Approval, ConfirmationError, Decision, Outcome, PendingConfirmation};
use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::FutureExt;
use keyward_telemetry::{metric_inc, CONFIRMATIONS_CREATED, CONFIRMATIONS_SETTLED};
use parking_lot::Mutex;
use shared_bus::{BusReply, MessageBus, RequestHandler, RequestRegistration};
use shared_types::{
    ConfirmationId, ConfirmationKind, ConfirmationPayload, DeclineReason, MessageId,
    WalletBroadcast, WalletError, WalletRequest, WalletResult,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type Action<T> = Box<dyn FnOnce(Approval) -> BoxFuture<'static, WalletResult<T>> + Send>;
type Settlement<T> = Result<T, ConfirmationError>;

/// Creates and tracks confirmations.
pub struct ConfirmationCoordinator {
    bus: MessageBus,
    config: ConfirmationConfig,
    pending: Arc<DashMap<ConfirmationId, PendingConfirmation>>,
}

impl ConfirmationCoordinator {
    /// Create a coordinator publishing on `bus`.
    pub fn new(bus: MessageBus, config: ConfirmationConfig) -> Self {
        Self {
            bus,
            config,
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Ask the user to approve `payload`, then run `action`.
    ///
    /// Resolves with the action's value on approval. Resolves with
    /// `Declined(Explicit)` on a decline and `Declined(Timeout)` when no
    /// decision arrives before the configured deadline. An action error
    /// comes back as `Fault` and is also returned to the decision's sender.
    pub async fn create_confirmation<T, F, Fut>(
        &self,
        payload: ConfirmationPayload,
        action: F,
    ) -> Result<T, ConfirmationError>
    where
        T: Send + 'static,
        F: FnOnce(Approval) -> Fut + Send + 'static,
        Fut: Future<Output = WalletResult<T>> + Send + 'static,
    {
        let id = ConfirmationId::new();
        let kind = payload.kind();
        let deadline = Instant::now() + self.config.timeout;
        let (result_tx, result_rx) = oneshot::channel();
        let run: Action<T> = Box::new(move |approval| action(approval).boxed());

        let confirmation = Arc::new(Confirmation {
            id,
            kind,
            bus: self.bus.clone(),
            pending: Arc::clone(&self.pending),
            settled: AtomicBool::new(false),
            closing: AtomicBool::new(false),
            result_tx: Mutex::new(Some(result_tx)),
            action: Mutex::new(Some(run)),
            registration: Mutex::new(None),
            timer: Mutex::new(None),
        });
        self.pending
            .insert(id, PendingConfirmation { id, kind, deadline });

        // Listen before announcing so an immediate decision is not missed.
        let registration = self.bus.on_request(Arc::new(DecisionHandler {
            confirmation: Arc::clone(&confirmation),
        }));
        *confirmation.registration.lock() = Some(registration);

        metric_inc!(CONFIRMATIONS_CREATED, &[kind.to_string().as_str()]);
        info!(%id, %kind, "Confirmation requested");
        self.bus
            .broadcast(WalletBroadcast::ConfirmRequested { id, payload });

        let timer = tokio::spawn({
            let confirmation = Arc::clone(&confirmation);
            async move {
                tokio::time::sleep_until(deadline).await;
                confirmation.expire();
            }
        });
        *confirmation.timer.lock() = Some(timer.abort_handle());
        // A decision may already have closed it.
        if confirmation.closing.load(Ordering::Acquire) {
            timer.abort();
        }

        match result_rx.await {
            Ok(settlement) => settlement,
            Err(_) => Err(ConfirmationError::Fault(WalletError::Internal(
                "confirmation dropped without settling".into(),
            ))),
        }
    }

    /// Confirmations still waiting for a decision.
    #[must_use]
    pub fn pending(&self) -> Vec<PendingConfirmation> {
        self.pending.iter().map(|entry| *entry.value()).collect()
    }

    /// Number of confirmations still waiting.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether `id` is still waiting.
    #[must_use]
    pub fn is_pending(&self, id: &ConfirmationId) -> bool {
        self.pending.contains_key(id)
    }

    /// The pending confirmation `id`, if still waiting.
    #[must_use]
    pub fn get(&self, id: &ConfirmationId) -> Option<PendingConfirmation> {
        self.pending.get(id).map(|entry| *entry.value())
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ConfirmationConfig {
        &self.config
    }
}

/// One live confirmation.
struct Confirmation<T> {
    id: ConfirmationId,
    kind: ConfirmationKind,
    bus: MessageBus,
    pending: Arc<DashMap<ConfirmationId, PendingConfirmation>>,
    settled: AtomicBool,
    closing: AtomicBool,
    result_tx: Mutex<Option<oneshot::Sender<Settlement<T>>>>,
    action: Mutex<Option<Action<T>>>,
    registration: Mutex<Option<RequestRegistration>>,
    timer: Mutex<Option<AbortHandle>>,
}

impl<T: Send + 'static> Confirmation<T> {
    /// Take the right to settle. Only the first caller gets `true`.
    fn claim(&self) -> bool {
        self.settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn expire(&self) {
        if !self.claim() {
            return;
        }
        warn!(id = %self.id, kind = %self.kind, "Confirmation timed out");
        self.close();
        self.settle(
            Outcome::Timeout,
            Err(ConfirmationError::Declined(DeclineReason::Timeout)),
        );
    }

    /// Act on a claimed decision and produce the reply for its sender.
    async fn decide(&self, decision: Decision) -> BusReply {
        match decision {
            Decision::Decline => {
                info!(id = %self.id, kind = %self.kind, "Confirmation declined");
                self.close();
                self.settle(
                    Outcome::Declined,
                    Err(ConfirmationError::Declined(DeclineReason::Explicit)),
                );
                Ok(acknowledgement(self.id, self.kind))
            }
            Decision::Approve(approval) => {
                let action = self.action.lock().take();
                let result = match action {
                    Some(action) => action(approval).await,
                    None => Err(WalletError::Internal("confirmation action missing".into())),
                };
                self.close();
                match result {
                    Ok(value) => {
                        info!(id = %self.id, kind = %self.kind, "Confirmation approved");
                        self.settle(Outcome::Approved, Ok(value));
                        Ok(acknowledgement(self.id, self.kind))
                    }
                    Err(err) => {
                        warn!(id = %self.id, kind = %self.kind, error = %err, "Approved action failed");
                        self.settle(Outcome::Failed, Err(ConfirmationError::Fault(err.clone())));
                        Err(err)
                    }
                }
            }
        }
    }

    fn settle(&self, outcome: Outcome, settlement: Settlement<T>) {
        let kind = self.kind.to_string();
        metric_inc!(CONFIRMATIONS_SETTLED, &[kind.as_str(), outcome.as_str()]);
        if let Some(tx) = self.result_tx.lock().take() {
            if tx.send(settlement).is_err() {
                debug!(id = %self.id, "Confirmation caller went away before settlement");
            }
        }
    }

    /// Tear down exactly once.
    fn close(&self) {
        if self.closing.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(timer) = self.timer.lock().take() {
            timer.abort();
        }
        drop(self.registration.lock().take());
        self.pending.remove(&self.id);
        self.bus
            .broadcast(WalletBroadcast::ConfirmExpired { id: self.id });
        debug!(id = %self.id, "Confirmation closed");
    }
}

/// Bus handler claiming the decisions for one confirmation.
struct DecisionHandler<T> {
    confirmation: Arc<Confirmation<T>>,
}

#[async_trait]
impl<T: Send + 'static> RequestHandler for DecisionHandler<T> {
    async fn handle(&self, _id: MessageId, request: &WalletRequest) -> Option<BusReply> {
        let confirmation = &self.confirmation;
        let decision = Decision::from_request(confirmation.id, confirmation.kind, request)?;
        if !confirmation.claim() {
            // Lost to the deadline or an earlier decision; answer now rather
            // than leave the sender waiting out the bus timeout.
            debug!(id = %confirmation.id, "Decision for a settled confirmation refused");
            return Some(Err(WalletError::InvalidRequest(format!(
                "Confirmation {} is not pending",
                confirmation.id
            ))));
        }
        Some(confirmation.decide(decision).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{BroadcastReceiver, BusConfig, BusError};
    use shared_types::{Password, PublicKeyHash, VaultError, WalletResponse};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::task::JoinHandle;

    fn sign_payload() -> ConfirmationPayload {
        ConfirmationPayload::Sign {
            account_public_key_hash: PublicKeyHash::new("tz1test"),
            bytes: "0300aa".into(),
            watermark: None,
        }
    }

    fn setup(timeout: Duration) -> (MessageBus, Arc<ConfirmationCoordinator>, BroadcastReceiver) {
        let bus = MessageBus::new(BusConfig::default());
        let events = bus.subscribe_channel();
        let coordinator = Arc::new(ConfirmationCoordinator::new(
            bus.clone(),
            ConfirmationConfig { timeout },
        ));
        (bus, coordinator, events)
    }

    async fn next_requested(events: &mut BroadcastReceiver) -> ConfirmationId {
        loop {
            match events.recv().await {
                Some(WalletBroadcast::ConfirmRequested { id, .. }) => return id,
                Some(_) => continue,
                None => panic!("bus closed"),
            }
        }
    }

    fn expired_count(events: &mut BroadcastReceiver, id: ConfirmationId) -> usize {
        events
            .drain()
            .into_iter()
            .filter(|m| *m == WalletBroadcast::ConfirmExpired { id })
            .count()
    }

    /// Spawn a sign confirmation whose action echoes the password.
    fn spawn_sign(
        coordinator: &Arc<ConfirmationCoordinator>,
        runs: &Arc<AtomicUsize>,
    ) -> JoinHandle<Result<Option<String>, ConfirmationError>> {
        let coordinator = Arc::clone(coordinator);
        let runs = Arc::clone(runs);
        tokio::spawn(async move {
            coordinator
                .create_confirmation(sign_payload(), move |approval| async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(approval.password().map(|p| p.expose().to_string()))
                })
                .await
        })
    }

    fn confirm(id: ConfirmationId, confirm: bool) -> WalletRequest {
        WalletRequest::ConfirmRequest {
            id,
            confirm,
            password: Some(Password::new("pw")),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_approval_runs_action_once() {
        let (bus, coordinator, mut events) = setup(Duration::from_secs(60));
        let runs = Arc::new(AtomicUsize::new(0));
        let task = spawn_sign(&coordinator, &runs);

        let id = next_requested(&mut events).await;
        assert!(coordinator.is_pending(&id));

        let reply = bus.request(confirm(id, true)).await.unwrap();
        assert_eq!(reply, Ok(WalletResponse::ConfirmResponse { id }));
        assert_eq!(task.await.unwrap(), Ok(Some("pw".to_string())));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.pending_count(), 0);
        assert_eq!(expired_count(&mut events, id), 1);

        // A second decision finds nobody listening.
        let err = bus.request(confirm(id, true)).await.unwrap_err();
        assert!(matches!(err, BusError::Timeout { .. }));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_decline() {
        let (bus, coordinator, mut events) = setup(Duration::from_secs(60));
        let runs = Arc::new(AtomicUsize::new(0));
        let task = spawn_sign(&coordinator, &runs);

        let id = next_requested(&mut events).await;
        let reply = bus.request(confirm(id, false)).await.unwrap();
        assert_eq!(reply, Ok(WalletResponse::ConfirmResponse { id }));
        assert_eq!(
            task.await.unwrap(),
            Err(ConfirmationError::Declined(DeclineReason::Explicit))
        );
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(expired_count(&mut events, id), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_declines_with_timeout() {
        let (bus, coordinator, mut events) = setup(Duration::from_secs(60));
        let runs = Arc::new(AtomicUsize::new(0));
        let started = Instant::now();
        let task = spawn_sign(&coordinator, &runs);

        let id = next_requested(&mut events).await;
        assert_eq!(
            task.await.unwrap(),
            Err(ConfirmationError::Declined(DeclineReason::Timeout))
        );
        assert!(started.elapsed() >= Duration::from_secs(60));
        assert_eq!(expired_count(&mut events, id), 1);
        assert!(!coordinator.is_pending(&id));

        // Late approval is a no-op.
        assert!(bus.request(confirm(id, true)).await.is_err());
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(expired_count(&mut events, id), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decision_and_deadline_in_same_tick_settle_once() {
        let (bus, coordinator, mut events) = setup(Duration::from_secs(60));
        let runs = Arc::new(AtomicUsize::new(0));
        let task = spawn_sign(&coordinator, &runs);
        let id = next_requested(&mut events).await;

        let decision = tokio::spawn({
            let bus = bus.clone();
            async move { bus.request(confirm(id, true)).await }
        });
        tokio::time::advance(Duration::from_secs(60)).await;

        match task.await.unwrap() {
            Ok(password) => {
                assert_eq!(password.as_deref(), Some("pw"));
                assert_eq!(runs.load(Ordering::SeqCst), 1);
            }
            Err(ConfirmationError::Declined(DeclineReason::Timeout)) => {
                assert_eq!(runs.load(Ordering::SeqCst), 0);
            }
            other => panic!("unexpected settlement: {other:?}"),
        }
        let _ = decision.await.unwrap();
        assert_eq!(expired_count(&mut events, id), 1);
        assert_eq!(coordinator.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_does_not_cancel_running_approval() {
        let (bus, coordinator, mut events) = setup(Duration::from_secs(1));
        let task = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move {
                coordinator
                    .create_confirmation(sign_payload(), |_| async {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        Ok("signed")
                    })
                    .await
            }
        });

        let id = next_requested(&mut events).await;
        let reply = bus.request(confirm(id, true)).await.unwrap();
        assert_eq!(reply, Ok(WalletResponse::ConfirmResponse { id }));
        assert_eq!(task.await.unwrap(), Ok("signed"));
        assert_eq!(expired_count(&mut events, id), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decision_after_claim_is_refused_at_once() {
        let (bus, coordinator, mut events) = setup(Duration::from_secs(60));
        let task = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move {
                coordinator
                    .create_confirmation(sign_payload(), |_| async {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        Ok("signed")
                    })
                    .await
            }
        });
        let id = next_requested(&mut events).await;

        let first = tokio::spawn({
            let bus = bus.clone();
            async move { bus.request(confirm(id, true)).await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;

        // The approval is still running, so its handler is still registered.
        let started = Instant::now();
        let second = bus.request(confirm(id, false)).await.unwrap();
        assert!(matches!(second, Err(WalletError::InvalidRequest(_))));
        assert!(started.elapsed() < Duration::from_secs(4));

        assert_eq!(
            first.await.unwrap().unwrap(),
            Ok(WalletResponse::ConfirmResponse { id })
        );
        assert_eq!(task.await.unwrap(), Ok("signed"));
        assert_eq!(expired_count(&mut events, id), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_error_reaches_both_sides() {
        let (bus, coordinator, mut events) = setup(Duration::from_secs(60));
        let task = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move {
                coordinator
                    .create_confirmation(sign_payload(), |_| async {
                        Err::<(), WalletError>(VaultError::InvalidPassword.into())
                    })
                    .await
            }
        });

        let id = next_requested(&mut events).await;
        let reply = bus.request(confirm(id, true)).await.unwrap();
        assert_eq!(reply, Err(WalletError::Vault(VaultError::InvalidPassword)));
        assert_eq!(
            task.await.unwrap(),
            Err(ConfirmationError::Fault(VaultError::InvalidPassword.into()))
        );
        assert_eq!(expired_count(&mut events, id), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_kind_decision_is_not_claimed() {
        let (bus, coordinator, mut events) = setup(Duration::from_secs(60));
        let task = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move {
                let payload = ConfirmationPayload::DAppOperation {
                    origin: "https://app.example".into(),
                    source_pkh: PublicKeyHash::new("tz1test"),
                    op_params: vec![],
                };
                coordinator
                    .create_confirmation(payload, |approval| async move {
                        Ok(approval.password().is_some())
                    })
                    .await
            }
        });

        let id = next_requested(&mut events).await;
        // A plain ConfirmRequest does not decide an operation confirmation.
        assert!(bus.request(confirm(id, true)).await.is_err());
        assert_eq!(
            task.await.unwrap(),
            Err(ConfirmationError::Declined(DeclineReason::Timeout))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_confirmations_are_independent() {
        let (bus, coordinator, mut events) = setup(Duration::from_secs(60));
        let runs = Arc::new(AtomicUsize::new(0));

        let first = spawn_sign(&coordinator, &runs);
        let first_id = next_requested(&mut events).await;
        let second = spawn_sign(&coordinator, &runs);
        let second_id = next_requested(&mut events).await;
        assert_ne!(first_id, second_id);
        assert_eq!(coordinator.pending_count(), 2);

        tokio_test::assert_ok!(bus.request(confirm(second_id, false)).await);
        assert_eq!(
            second.await.unwrap(),
            Err(ConfirmationError::Declined(DeclineReason::Explicit))
        );
        assert!(coordinator.is_pending(&first_id));

        tokio_test::assert_ok!(bus.request(confirm(first_id, true)).await);
        assert_eq!(first.await.unwrap(), Ok(Some("pw".to_string())));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_snapshot_carries_deadline() {
        let (_bus, coordinator, mut events) = setup(Duration::from_secs(60));
        let runs = Arc::new(AtomicUsize::new(0));
        let before = Instant::now();
        let _task = spawn_sign(&coordinator, &runs);

        let id = next_requested(&mut events).await;
        let pending = coordinator.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id);
        assert_eq!(pending[0].kind, ConfirmationKind::Sign);
        assert!(pending[0].deadline >= before + Duration::from_secs(60));
    }
}
