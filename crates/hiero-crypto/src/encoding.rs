//! Text encodings used on the wire.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CryptoError;

/// Multibase prefix for base58btc.
pub const MULTIBASE_BASE58BTC: char = 'z';

pub fn bytes_to_b64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn b64_to_bytes(value: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(value)
        .map_err(|e| CryptoError::Decoding(format!("invalid base64: {}", e)))
}

pub fn bytes_to_b58(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn b58_to_bytes(value: &str) -> Result<Vec<u8>, CryptoError> {
    bs58::decode(value)
        .into_vec()
        .map_err(|e| CryptoError::Decoding(format!("invalid base58: {}", e)))
}

pub fn multibase_encode(data: &[u8]) -> String {
    format!("{}{}", MULTIBASE_BASE58BTC, bytes_to_b58(data))
}

/// Decode a multibase string. Only base58btc is accepted.
pub fn multibase_decode(value: &str) -> Result<Vec<u8>, CryptoError> {
    match value.strip_prefix(MULTIBASE_BASE58BTC) {
        Some(rest) => b58_to_bytes(rest),
        None => Err(CryptoError::Decoding(format!(
            "unsupported multibase prefix in '{}'",
            value
        ))),
    }
}
