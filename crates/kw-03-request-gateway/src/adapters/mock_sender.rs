//! Operation sender that never touches a network.

use crate::ports::OperationSender;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{DAppError, DAppSession, OperationRequest, Password, WalletResult};

/// Returns a fixed hash (or failure) and records what it was asked to send.
#[derive(Debug)]
pub struct MockOperationSender {
    result: WalletResult<String>,
    sent: Mutex<Vec<OperationRequest>>,
}

impl MockOperationSender {
    /// Always answer with `op_hash`.
    pub fn succeeding(op_hash: impl Into<String>) -> Self {
        Self {
            result: Ok(op_hash.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Always fail as the network would.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(DAppError::broadcast(message).into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn sent(&self) -> Vec<OperationRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl OperationSender for MockOperationSender {
    async fn send(
        &self,
        _grant: &DAppSession,
        request: &OperationRequest,
        _password: &Password,
    ) -> WalletResult<String> {
        self.sent.lock().push(request.clone());
        self.result.clone()
    }
}
