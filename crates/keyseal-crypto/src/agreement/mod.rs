//! Finite-field Diffie-Hellman key agreement.
//!
//! Both parties hold the same [`DomainParameters`]. Each runs a
//! [`KeyAgreement`] session, sends its exported public value over an
//! external transport, and feeds the peer's value into
//! [`KeyAgreement::compute_shared_key`]. The raw group element is never
//! handed out: it goes straight through HKDF into a 32-byte [`DerivedKey`].
//!
//! # Security
//!
//! Peer values are range- and subgroup-checked before any exponentiation
//! with the private exponent. Every exponentiation uses a freshly blinded
//! exponent, and the session only ever stores a blinded form. Secret
//! `BigUint` values are cleared in place once used. `num-bigint`'s own
//! scratch space inside `modpow` is still not wiped, and `modpow` timing
//! still depends on the (blinded) exponent's length.

mod blinding;
pub mod derivation;
pub mod params;
mod primality;
pub mod session;

pub use derivation::{DERIVED_KEY_SIZE, DerivedKey, KDF_CONTEXT_LABEL, derive_key};
pub use params::DomainParameters;
pub use session::{AgreementState, KeyAgreement};
