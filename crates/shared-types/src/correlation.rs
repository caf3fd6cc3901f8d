//! Ids that tie a bus response to its request and a decision to its
//! confirmation.
//!
//! Both are UUID v7, so ids sort by creation time in logs.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, time-ordered id. Serialized as the plain UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

/// Id of one request on the bus; its response carries the same value.
pub type MessageId = CorrelationId;

/// Id of one pending confirmation, echoed back in the user's decision.
pub type ConfirmationId = CorrelationId;

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Read an id received from a front-end.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        s.parse().map(Self)
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
