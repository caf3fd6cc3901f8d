//! Decisions arriving from the front-end.

use shared_types::{
    ConfirmationId, ConfirmationKind, Password, PublicKeyHash, WalletRequest, WalletResponse,
};

/// Data carried by an approving decision, shaped by the confirmation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
    /// Signing approved, with the password the user typed.
    Sign { password: Option<Password> },
    /// Connection approved for an account.
    DAppPermission {
        pkh: Option<PublicKeyHash>,
        public_key: Option<String>,
    },
    /// Operation approved, with the password the user typed.
    DAppOperation { password: Option<Password> },
}

impl Approval {
    /// Password for kinds that carry one.
    #[must_use]
    pub fn password(&self) -> Option<&Password> {
        match self {
            Approval::Sign { password } | Approval::DAppOperation { password } => {
                password.as_ref()
            }
            Approval::DAppPermission { .. } => None,
        }
    }
}

/// A confirm or decline for one confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve(Approval),
    Decline,
}

impl Decision {
    /// Extract the decision for `(id, kind)` from a bus request.
    ///
    /// Returns `None` when the request is not a decision of the matching
    /// kind for this id.
    #[must_use]
    pub fn from_request(
        id: ConfirmationId,
        kind: ConfirmationKind,
        request: &WalletRequest,
    ) -> Option<Self> {
        let (confirm, approval) = match (kind, request) {
            (
                ConfirmationKind::Sign,
                WalletRequest::ConfirmRequest {
                    id: req_id,
                    confirm,
                    password,
                },
            ) if *req_id == id => (
                *confirm,
                Approval::Sign {
                    password: password.clone(),
                },
            ),
            (
                ConfirmationKind::DAppPermission,
                WalletRequest::DAppPermissionConfirmRequest {
                    id: req_id,
                    confirm,
                    pkh,
                    public_key,
                },
            ) if *req_id == id => (
                *confirm,
                Approval::DAppPermission {
                    pkh: pkh.clone(),
                    public_key: public_key.clone(),
                },
            ),
            (
                ConfirmationKind::DAppOperation,
                WalletRequest::DAppOperationConfirmRequest {
                    id: req_id,
                    confirm,
                    password,
                },
            ) if *req_id == id => (
                *confirm,
                Approval::DAppOperation {
                    password: password.clone(),
                },
            ),
            _ => return None,
        };

        Some(if confirm {
            Decision::Approve(approval)
        } else {
            Decision::Decline
        })
    }
}

/// Acknowledgement sent back to whoever submitted the decision.
#[must_use]
pub fn acknowledgement(id: ConfirmationId, kind: ConfirmationKind) -> WalletResponse {
    match kind {
        ConfirmationKind::Sign => WalletResponse::ConfirmResponse { id },
        ConfirmationKind::DAppPermission => WalletResponse::DAppPermissionConfirmResponse { id },
        ConfirmationKind::DAppOperation => WalletResponse::DAppOperationConfirmResponse { id },
    }
}
