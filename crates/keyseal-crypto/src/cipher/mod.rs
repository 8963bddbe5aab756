//! Envelope encryption under a [`DerivedKey`](crate::DerivedKey).
//!
//! Two constructions, both base64 on the wire and both authenticated:
//!
//! - [`cbc`]: AES-256-CBC with PKCS#7 padding, encrypt-then-MAC with
//!   HMAC-SHA256 under split subkeys. `IV || ciphertext || tag`.
//! - [`aead`]: XChaCha20-Poly1305. `nonce || ciphertext || tag`.
//!
//! Every decryption failure, whatever the stage, is reported as the same
//! opaque [`CryptoError::DecryptionFailed`](crate::CryptoError::DecryptionFailed).

use std::fmt;

pub mod aead;
pub mod cbc;

pub use self::aead::{decrypt_aead, encrypt_aead};
pub use self::cbc::{decrypt, encrypt};

/// Transport-encoded ciphertext: base64(nonce || ciphertext || tag).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CipherEnvelope(String);

impl CipherEnvelope {
    /// Wrap an envelope received from the transport.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded form, ready to send.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CipherEnvelope {
    fn from(encoded: String) -> Self {
        Self(encoded)
    }
}

impl From<&str> for CipherEnvelope {
    fn from(encoded: &str) -> Self {
        Self(encoded.to_owned())
    }
}

impl fmt::Display for CipherEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
