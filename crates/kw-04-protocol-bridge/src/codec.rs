//! # Wire Codec
//!
//! Beacon messages travel as Base58Check-encoded JSON.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Codec failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid base58check payload: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error("invalid message json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a wire string into a message.
pub fn decode_message<T: DeserializeOwned>(encoded: &str) -> Result<T, CodecError> {
    let bytes = bs58::decode(encoded.trim()).with_check(None).into_vec()?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Encode a message into a wire string.
pub fn encode_message<T: Serialize>(message: &T) -> Result<String, CodecError> {
    let json = serde_json::to_vec(message)?;
    Ok(bs58::encode(json).with_check().into_string())
}
