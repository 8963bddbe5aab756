//! Optional Ed25519 signatures over message digests
//!
//! Not part of the key agreement itself: nothing here binds an identity to a
//! Diffie-Hellman public value unless the caller signs that value. Signatures
//! cover the SHA-256 digest of a message's canonical bytes.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::{
    env::RandomSource,
    error::{CryptoError, CryptoResult},
    mac::MessageLike,
};

/// Ed25519 signature size (64 bytes)
pub const SIGNATURE_SIZE: usize = 64;

/// Ed25519 public key size (32 bytes)
pub const PUBLIC_IDENTITY_SIZE: usize = 32;

/// Long-term signing key. Zeroized on drop.
pub struct SigningIdentity {
    signing_key: SigningKey,
}

impl SigningIdentity {
    /// Generate a fresh identity from `rng`.
    pub fn generate<R: RandomSource>(rng: &R) -> Self {
        let mut seed: [u8; 32] = rng.random_array();
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Self { signing_key }
    }

    /// Public half, safe to publish.
    pub fn public_identity(&self) -> PublicIdentity {
        PublicIdentity { verifying_key: self.signing_key.verifying_key() }
    }

    /// Sign the digest of `message`.
    pub fn sign<'m>(&self, message: impl Into<MessageLike<'m>>) -> SignatureBytes {
        let digest = Sha256::digest(message.into().canonical_bytes());
        SignatureBytes(self.signing_key.sign(&digest).to_bytes())
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("public", &self.public_identity())
            .finish_non_exhaustive()
    }
}

/// Ed25519 verifying key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicIdentity {
    verifying_key: VerifyingKey,
}

impl PublicIdentity {
    /// Parse raw key bytes.
    ///
    /// # Errors
    ///
    /// - `InvalidLength`: If `bytes` is not 32 bytes long
    /// - `SignatureInvalid`: If the bytes are not a valid curve point
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; PUBLIC_IDENTITY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidLength { expected: PUBLIC_IDENTITY_SIZE, actual: bytes.len() }
        })?;
        let verifying_key =
            VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::SignatureInvalid)?;
        Ok(Self { verifying_key })
    }

    /// Raw key bytes.
    pub fn to_bytes(&self) -> [u8; PUBLIC_IDENTITY_SIZE] {
        self.verifying_key.to_bytes()
    }

    /// Hex transport form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse the hex transport form.
    ///
    /// # Errors
    ///
    /// - `InvalidLength`: If the hex is malformed or the wrong length
    /// - `SignatureInvalid`: If the bytes are not a valid curve point
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidLength {
            expected: PUBLIC_IDENTITY_SIZE,
            actual: s.len() / 2,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Verify `signature` over the digest of `message`.
    ///
    /// Uses strict verification, rejecting non-canonical and small-order
    /// encodings.
    ///
    /// # Errors
    ///
    /// - `SignatureInvalid`: If the signature does not match
    pub fn verify<'m>(
        &self,
        message: impl Into<MessageLike<'m>>,
        signature: &SignatureBytes,
    ) -> CryptoResult<()> {
        let digest = Sha256::digest(message.into().canonical_bytes());
        let signature = Signature::from_bytes(&signature.0);
        self.verifying_key
            .verify_strict(&digest, &signature)
            .map_err(|_| CryptoError::SignatureInvalid)
    }
}

impl fmt::Debug for PublicIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicIdentity({}...)", &self.to_hex()[..16])
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SignatureBytes(pub [u8; SIGNATURE_SIZE]);

impl SignatureBytes {
    /// Parse raw signature bytes.
    ///
    /// # Errors
    ///
    /// - `InvalidLength`: If `bytes` is not 64 bytes long
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; SIGNATURE_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidLength { expected: SIGNATURE_SIZE, actual: bytes.len() }
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for SignatureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureBytes({}...)", hex::encode(&self.0[..8]))
    }
}
