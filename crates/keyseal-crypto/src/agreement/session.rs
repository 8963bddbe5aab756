//! Per-session Diffie-Hellman state machine
//!
//! A session owns one fresh key pair. It starts in
//! [`AgreementState::Initialized`] and moves to
//! [`AgreementState::SecretComputed`] exactly once, when the peer's public
//! value has been validated and the session key derived. The private exponent
//! is wiped on that transition.
//!
//! The exponent is held only in blinded form `x + r·n`, where `n` is a
//! multiple of the group order, and the public value is computed from a
//! separately blinded copy.

use std::fmt;

use num_bigint::BigUint;
use zeroize::Zeroizing;

use super::{
    blinding::{blind, wipe},
    derivation::{DerivedKey, derive_key},
    params::DomainParameters,
    primality::random_in_range,
};
use crate::{
    config::AgreementConfig,
    encoding,
    env::RandomSource,
    error::{CryptoError, CryptoResult},
};

/// Key agreement lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgreementState {
    /// Key pair generated, waiting for the peer's public value
    Initialized,
    /// Shared key derived; the private exponent has been destroyed
    SecretComputed,
}

/// One side of a Diffie-Hellman exchange.
pub struct KeyAgreement {
    params: DomainParameters,
    /// Blinded private exponent, big-endian. Emptied once the secret is computed.
    private_exponent: Zeroizing<Vec<u8>>,
    public_value: BigUint,
    state: AgreementState,
}

impl KeyAgreement {
    /// Validate `(p, g)` under the default [`AgreementConfig`] and generate a
    /// fresh key pair.
    ///
    /// # Errors
    ///
    /// - `InvalidParameters`: If the parameters fail validation
    pub fn initialize<R: RandomSource>(p: &BigUint, g: &BigUint, rng: &R) -> CryptoResult<Self> {
        let params = DomainParameters::new(p.clone(), g.clone(), &AgreementConfig::default(), rng)?;
        Ok(Self::new(params, rng))
    }

    /// Generate a fresh key pair bound to already-validated parameters.
    ///
    /// The exponent is drawn from `[2, q-1]` when the subgroup order `q` is
    /// known, otherwise from `[2, p-2]`.
    pub fn new<R: RandomSource>(params: DomainParameters, rng: &R) -> Self {
        let two = BigUint::from(2u32);
        let high = match params.subgroup_order() {
            Some(q) => q - 1u32,
            None => params.modulus() - 2u32,
        };
        let mut exponent = random_in_range(rng, &two, &high);

        let session = Self::with_exponent(params, &exponent, rng);
        wipe(&mut exponent);
        tracing::debug!(
            modulus_bits = session.params.modulus_bits(),
            prime_order_subgroup = session.params.subgroup_order().is_some(),
            "key agreement initialized"
        );
        session
    }

    fn with_exponent<R: RandomSource>(
        params: DomainParameters,
        exponent: &BigUint,
        rng: &R,
    ) -> Self {
        let period = params.exponent_period();

        let mut blinded = blind(exponent, &period, rng);
        let public_value = params.generator().modpow(&blinded, params.modulus());
        wipe(&mut blinded);

        let mut stored = blind(exponent, &period, rng);
        let private_exponent = Zeroizing::new(stored.to_bytes_be());
        wipe(&mut stored);

        Self { params, private_exponent, public_value, state: AgreementState::Initialized }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AgreementState {
        self.state
    }

    /// Domain parameters this session is bound to.
    pub fn params(&self) -> &DomainParameters {
        &self.params
    }

    /// Public value as fixed-width big-endian bytes.
    pub fn public_value_bytes(&self) -> Vec<u8> {
        self.params.encode_element(&self.public_value)
    }

    /// Public value in transport form (base64 of the fixed-width bytes).
    ///
    /// Safe to send to the peer. Available in every state.
    pub fn export_public_value(&self) -> String {
        encoding::encode(&self.public_value_bytes())
    }

    /// Validate the peer's exported public value and derive the session key.
    ///
    /// Validation runs before the private exponent is touched. A rejected
    /// value leaves the session in [`AgreementState::Initialized`] so the
    /// caller may abort cleanly; it never retries on its own.
    ///
    /// # Errors
    ///
    /// - `InvalidPeerKey`: If the value is not valid base64, has the wrong
    ///   length for these parameters, is degenerate, or lies outside the
    ///   prime-order subgroup
    /// - `InvalidState`: If the shared key was already computed
    pub fn compute_shared_key(&mut self, peer_public_value: &str) -> CryptoResult<DerivedKey> {
        if self.state != AgreementState::Initialized {
            return Err(CryptoError::InvalidState {
                state: self.state,
                operation: "compute shared key",
            });
        }

        let peer = self.decode_peer(peer_public_value).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected peer public value");
        })?;

        let mut exponent = BigUint::from_bytes_be(&self.private_exponent);
        let mut shared = peer.modpow(&exponent, self.params.modulus());
        wipe(&mut exponent);
        let secret = Zeroizing::new(self.params.encode_element(&shared));
        wipe(&mut shared);
        let key = derive_key(&secret);

        self.private_exponent = Zeroizing::new(Vec::new());
        self.state = AgreementState::SecretComputed;
        tracing::debug!("shared key derived");

        Ok(key)
    }

    fn decode_peer(&self, encoded: &str) -> CryptoResult<BigUint> {
        let bytes = encoding::decode(encoded)
            .map_err(|_| CryptoError::InvalidPeerKey { reason: "malformed base64" })?;
        if bytes.len() != self.params.element_len() {
            return Err(CryptoError::InvalidPeerKey {
                reason: "length does not match the domain parameters",
            });
        }

        let peer = BigUint::from_bytes_be(&bytes);
        self.params
            .check_public_element(&peer)
            .map_err(|reason| CryptoError::InvalidPeerKey { reason })?;
        Ok(peer)
    }
}

impl fmt::Debug for KeyAgreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyAgreement")
            .field("modulus_bits", &self.params.modulus_bits())
            .field("state", &self.state)
            .field("public_value", &self.export_public_value())
            .finish_non_exhaustive()
    }
}
