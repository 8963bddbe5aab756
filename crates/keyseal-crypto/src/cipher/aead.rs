//! Message encryption using `XChaCha20-Poly1305`
//!
//! The 192-bit nonce is large enough to draw at random for every message
//! without tracking counters.

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};

use super::CipherEnvelope;
use crate::{
    agreement::DerivedKey,
    encoding,
    env::RandomSource,
    error::{CryptoError, CryptoResult},
};

/// `XChaCha20` nonce size (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
const POLY1305_TAG_SIZE: usize = 16;

/// Encrypt `plaintext` under `key` with a fresh random nonce.
///
/// # Security
///
/// - Nonce is drawn fresh from `rng` for every call
/// - Authenticated encryption prevents tampering
pub fn encrypt_aead<R: RandomSource>(
    plaintext: &[u8],
    key: &DerivedKey,
    rng: &R,
) -> CipherEnvelope {
    let nonce: [u8; NONCE_SIZE] = rng.random_array();
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(&nonce), plaintext) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    let mut envelope = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(&ciphertext);

    CipherEnvelope(encoding::encode(&envelope))
}

/// Decrypt an envelope produced by [`encrypt_aead`].
///
/// # Errors
///
/// - `DecryptionFailed`: If the envelope is malformed, truncated, or fails
///   authentication (tamper or wrong key)
pub fn decrypt_aead(envelope: &CipherEnvelope, key: &DerivedKey) -> CryptoResult<Vec<u8>> {
    let raw = encoding::decode(envelope.as_str()).map_err(|_| CryptoError::DecryptionFailed)?;
    if raw.len() < NONCE_SIZE + POLY1305_TAG_SIZE {
        return Err(CryptoError::DecryptionFailed);
    }

    let (nonce, ciphertext) = raw.split_at(NONCE_SIZE);
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
