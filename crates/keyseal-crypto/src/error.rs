//! Error types for Keyseal cryptographic operations

use thiserror::Error;

use crate::agreement::AgreementState;

/// Errors from key agreement, envelope and signature operations.
///
/// Tag mismatch is deliberately absent: [`crate::verify`] reports it as
/// `false`, since a forged or corrupted tag is an expected outcome.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Domain parameters are malformed or too weak
    #[error("invalid domain parameters: {reason}")]
    InvalidParameters {
        /// Which check the parameters failed
        reason: String,
    },

    /// Peer public value failed decoding or group validation
    #[error("invalid peer public value: {reason}")]
    InvalidPeerKey {
        /// Which check the value failed
        reason: &'static str,
    },

    /// Malformed base64 transport encoding
    #[error("decoding failed: {0}")]
    Decoding(#[from] base64::DecodeError),

    /// Envelope could not be decrypted.
    ///
    /// Carries no detail so that callers cannot distinguish bad encoding,
    /// truncation, bad padding or authentication failure.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Operation not valid in the current key agreement state
    #[error("invalid state: cannot {operation} in {state:?}")]
    InvalidState {
        /// State when the operation was attempted
        state: AgreementState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Structured message could not be converted to canonical bytes
    #[error("canonicalization failed: {reason}")]
    Canonicalization {
        /// Serializer error message
        reason: String,
    },

    /// Decoded value has the wrong length
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Signature did not verify under the given public identity
    #[error("signature verification failed")]
    SignatureInvalid,
}

impl CryptoError {
    /// Returns true if this error must abort the current session step.
    ///
    /// Fatal errors indicate tampering, a hostile or broken peer, or unusable
    /// parameters. Non-fatal errors are local input mistakes the caller can
    /// correct (malformed encodings, unserializable messages, misuse of the
    /// state machine).
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidParameters { .. } => true,
            Self::InvalidPeerKey { .. } => true,
            Self::DecryptionFailed => true,
            Self::SignatureInvalid => true,

            Self::Decoding(_) => false,
            Self::InvalidState { .. } => false,
            Self::Canonicalization { .. } => false,
            Self::InvalidLength { .. } => false,
        }
    }
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;
