//! Binary-to-text transport encoding (standard base64 with padding)

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::CryptoResult;

/// Encode bytes for a text-oriented channel.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a transport string.
///
/// # Errors
///
/// - `Decoding`: If the input is not valid padded standard base64
pub fn decode(encoded: &str) -> CryptoResult<Vec<u8>> {
    Ok(STANDARD.decode(encoded)?)
}
