//! Keyseal Cryptographic Primitives
//!
//! Two-party secure messaging building blocks: finite-field Diffie-Hellman
//! key agreement, symmetric envelope encryption under the agreed key, and
//! keyed message authentication. Callers provide the randomness source so
//! that tests can run deterministically.
//!
//! # Key Lifecycle
//!
//! Each party owns one [`KeyAgreement`] session per exchange. Public values
//! travel over an external transport; the raw shared group element never
//! leaves the session and is immediately run through HKDF.
//!
//! ```text
//! DomainParameters (p, g)
//!        │
//!        ▼
//! KeyAgreement → export_public_value ──► peer
//!        │
//!        ▼
//! compute_shared_key(peer value) → DerivedKey (HKDF-SHA256)
//!        │
//!        ├──► encrypt / decrypt      (AES-256-CBC + HMAC-SHA256 envelope)
//!        ├──► encrypt_aead / ...     (XChaCha20-Poly1305 envelope)
//!        └──► SecureChannel          (same CBC envelope, subkeys split once)
//! ```
//!
//! A session computes its shared key exactly once. The private exponent is
//! wiped on that transition and the session cannot be reused.
//!
//! # Security
//!
//! Peer Validation:
//! - Public values must be exactly as long as the modulus
//! - Degenerate values (0, 1, p-1 and anything ≥ p) are rejected
//! - With a safe-prime group, values outside the prime-order subgroup are
//!   rejected before the private exponent is used
//!
//! Confidentiality:
//! - Fresh random IV/nonce per envelope from the caller's [`RandomSource`]
//! - Every decryption failure surfaces as the same opaque error
//!
//! Integrity:
//! - Every envelope carries a tag that is checked before decryption, so
//!   modified, truncated or reordered envelopes are rejected
//! - Tag comparison is constant-time
//!
//! Authentication:
//! - Anonymous key agreement alone does not authenticate the peer. Sign the
//!   exported public value with a [`SigningIdentity`] to bind it to a
//!   long-term key.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod agreement;
pub mod channel;
pub mod cipher;
pub mod config;
pub mod encoding;
pub mod env;
pub mod error;
pub mod mac;
pub mod signature;

pub use agreement::{AgreementState, DerivedKey, DomainParameters, KeyAgreement, derive_key};
pub use channel::SecureChannel;
pub use cipher::{CipherEnvelope, decrypt, decrypt_aead, encrypt, encrypt_aead};
pub use config::AgreementConfig;
pub use env::{OsRandom, RandomSource};
pub use error::{CryptoError, CryptoResult};
pub use mac::{AuthTag, MessageLike, tag, verify};
pub use signature::{PublicIdentity, SignatureBytes, SigningIdentity};
