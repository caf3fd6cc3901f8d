//! # Front-end Connection
//!
//! One connected front-end context speaking serialized [`BusEnvelope`]s.
//!
//! - Incoming request envelopes are sent over the bus; the reply goes back
//!   with the envelope's own id.
//! - Every broadcast is pushed to the connection's outbound queue.
//! - Malformed input gets an `InvalidRequest` response, never a panic.

use serde_json::Value;
use shared_bus::{BusError, MessageBus, Subscription};
use shared_types::{BusEnvelope, EnvelopeBody, MessageId, WalletError, WalletResponse};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A front-end attached to the runtime.
pub struct FrontendConnection {
    bus: MessageBus,
    _broadcasts: Subscription,
}

impl FrontendConnection {
    /// Attach to `bus`. Broadcast envelopes arrive on the returned receiver.
    pub fn connect(bus: &MessageBus) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = bus.subscribe(move |message| {
            match serde_json::to_string(&BusEnvelope::broadcast(message.clone())) {
                Ok(encoded) => {
                    // A closed receiver means the front-end went away.
                    let _ = tx.send(encoded);
                }
                Err(e) => warn!(error = %e, "Failed to encode broadcast"),
            }
        });
        let connection = Self {
            bus: bus.clone(),
            _broadcasts: subscription,
        };
        (connection, rx)
    }

    /// Handle one incoming message and produce the response envelope.
    pub async fn handle_incoming(&self, raw: &str) -> String {
        let envelope = self.respond(raw).await;
        serde_json::to_string(&envelope).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to encode response envelope");
            String::new()
        })
    }

    async fn respond(&self, raw: &str) -> BusEnvelope {
        let envelope: BusEnvelope = match serde_json::from_str(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(error = %e, "Malformed envelope");
                return invalid(recover_id(raw), format!("malformed envelope: {e}"));
            }
        };
        if !envelope.is_supported() {
            return invalid(
                recover_id(raw),
                format!("unsupported envelope version {}", envelope.version),
            );
        }

        let (id, request) = match envelope.body {
            EnvelopeBody::Request { id, request } => (id, request),
            _ => return invalid(recover_id(raw), "only requests are accepted".into()),
        };

        let result = match self.bus.request(request).await {
            Ok(reply) => reply,
            Err(BusError::Timeout { timeout, .. }) => Err(WalletError::Internal(format!(
                "no response within {timeout:?}"
            ))),
            Err(e) => Err(WalletError::Internal(e.to_string())),
        };
        BusEnvelope::response(id, result)
    }
}

fn invalid(id: MessageId, reason: String) -> BusEnvelope {
    BusEnvelope::response(
        id,
        Err::<WalletResponse, _>(WalletError::InvalidRequest(reason)),
    )
}

/// Best-effort id of a message that failed to parse.
fn recover_id(raw: &str) -> MessageId {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v.get("id").and_then(Value::as_str).map(str::to_owned))
        .and_then(|id| MessageId::parse(&id).ok())
        .unwrap_or_default()
}
