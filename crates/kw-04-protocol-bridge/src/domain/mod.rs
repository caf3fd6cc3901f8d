//! # Domain Module
//!
//! Beacon message shapes and the error taxonomy.

pub mod error;
pub mod message;

pub use error::{BridgeFailure, ErrorType};
pub use message::{
    BeaconAppMetadata, BeaconNetwork, BeaconRequest, BeaconResponse, RequestBody, RequestHeader,
    ResponseBody, ResponseHeader,
};
