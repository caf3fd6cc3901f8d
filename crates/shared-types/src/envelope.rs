//! # Bus Envelope
//!
//! Wire wrapper for messages crossing a front-end connection.
//!
//! ## Properties
//!
//! - **Versioning**: every envelope carries a `version`; unknown versions are
//!   rejected before the payload is looked at.
//! - **Correlation**: a response carries the `id` of its request.

use crate::correlation::MessageId;
use crate::errors::WalletError;
use crate::ipc::{WalletBroadcast, WalletRequest, WalletResponse};
use serde::{Deserialize, Serialize};

/// Envelope body, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EnvelopeBody {
    /// Request awaiting a response with the same id.
    Request {
        id: MessageId,
        request: WalletRequest,
    },
    /// Response to the request with this id.
    Response {
        id: MessageId,
        result: Result<WalletResponse, WalletError>,
    },
    /// Uncorrelated broadcast.
    Broadcast { message: WalletBroadcast },
}

/// A versioned message on a front-end connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEnvelope {
    /// Protocol version.
    pub version: u16,
    /// Message body.
    #[serde(flatten)]
    pub body: EnvelopeBody,
}

impl BusEnvelope {
    /// Current protocol version.
    pub const CURRENT_VERSION: u16 = 1;

    /// Wrap a request.
    pub fn request(id: MessageId, request: WalletRequest) -> Self {
        Self::wrap(EnvelopeBody::Request { id, request })
    }

    /// Wrap a response.
    pub fn response(id: MessageId, result: Result<WalletResponse, WalletError>) -> Self {
        Self::wrap(EnvelopeBody::Response { id, result })
    }

    /// Wrap a broadcast.
    pub fn broadcast(message: WalletBroadcast) -> Self {
        Self::wrap(EnvelopeBody::Broadcast { message })
    }

    fn wrap(body: EnvelopeBody) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            body,
        }
    }

    /// Whether this envelope speaks a supported version.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.version == Self::CURRENT_VERSION
    }
}
