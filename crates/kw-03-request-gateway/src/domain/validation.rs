//! Shape checks for dApp requests. Failures are `InvalidParams`.

use shared_types::{DAppError, OperationRequest, PermissionRequest};

/// The origin must be present.
pub fn validate_origin(origin: &str) -> Result<(), DAppError> {
    if origin.trim().is_empty() {
        return Err(DAppError::invalid_params("Origin is missing"));
    }
    Ok(())
}

/// A permission request needs a network and an application name.
pub fn validate_permission(request: &PermissionRequest) -> Result<(), DAppError> {
    if request.network.trim().is_empty() {
        return Err(DAppError::invalid_params("Network is missing"));
    }
    if request.app_meta.name.trim().is_empty() {
        return Err(DAppError::invalid_params("Application name is missing"));
    }
    Ok(())
}

/// An operation request needs a source account and at least one operation
/// object.
pub fn validate_operation(request: &OperationRequest) -> Result<(), DAppError> {
    if request.source_pkh.as_str().trim().is_empty() {
        return Err(DAppError::invalid_params("Source account is missing"));
    }
    if request.op_params.is_empty() {
        return Err(DAppError::invalid_params("No operations given"));
    }
    if let Some(index) = request.op_params.iter().position(|op| !op.is_object()) {
        return Err(DAppError::invalid_params(format!(
            "Operation {index} is not an object"
        )));
    }
    Ok(())
}
