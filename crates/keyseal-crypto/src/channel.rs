//! Long-lived sender/receiver for authenticated CBC envelopes
//!
//! [`encrypt`](crate::encrypt) and [`decrypt`](crate::decrypt) split the
//! session key on every call. A [`SecureChannel`] splits it once and reuses
//! the subkeys, producing the same `base64(IV || ciphertext || tag)`
//! envelopes, so either side may use either API.

use std::fmt;

use crate::{
    agreement::DerivedKey,
    cipher::{CipherEnvelope, cbc::CbcHmacKeys},
    env::RandomSource,
    error::CryptoResult,
};

/// Symmetric channel state derived from one session key.
///
/// Immutable after construction; share it across threads by reference.
#[derive(Clone)]
pub struct SecureChannel {
    keys: CbcHmacKeys,
}

impl SecureChannel {
    /// Split `session_key` into encryption and authentication subkeys.
    pub fn new(session_key: &DerivedKey) -> Self {
        Self { keys: CbcHmacKeys::split(session_key) }
    }

    /// Encrypt `plaintext` and tag the IV and ciphertext.
    pub fn seal<R: RandomSource>(&self, plaintext: &[u8], rng: &R) -> CipherEnvelope {
        self.keys.seal(plaintext, rng)
    }

    /// Verify the tag, then decrypt.
    ///
    /// # Errors
    ///
    /// - `DecryptionFailed`: If the envelope is malformed, the tag does not
    ///   match, or the padding is invalid. All cases surface identically.
    pub fn open(&self, envelope: &CipherEnvelope) -> CryptoResult<Vec<u8>> {
        self.keys.open(envelope)
    }
}

impl fmt::Debug for SecureChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureChannel(<redacted>)")
    }
}
