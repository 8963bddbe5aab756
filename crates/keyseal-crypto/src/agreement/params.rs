//! Diffie-Hellman domain parameters and their validation

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::primality::is_probable_prime;
use crate::{
    config::AgreementConfig,
    env::RandomSource,
    error::{CryptoError, CryptoResult},
};

/// RFC 3526 group 14: 2048-bit MODP safe prime, generator 2.
const RFC3526_GROUP14_PRIME: [u8; 256] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xC9, 0x0F, 0xDA, 0xA2, 0x21, 0x68, 0xC2, 0x34,
    0xC4, 0xC6, 0x62, 0x8B, 0x80, 0xDC, 0x1C, 0xD1, 0x29, 0x02, 0x4E, 0x08, 0x8A, 0x67, 0xCC, 0x74,
    0x02, 0x0B, 0xBE, 0xA6, 0x3B, 0x13, 0x9B, 0x22, 0x51, 0x4A, 0x08, 0x79, 0x8E, 0x34, 0x04, 0xDD,
    0xEF, 0x95, 0x19, 0xB3, 0xCD, 0x3A, 0x43, 0x1B, 0x30, 0x2B, 0x0A, 0x6D, 0xF2, 0x5F, 0x14, 0x37,
    0x4F, 0xE1, 0x35, 0x6D, 0x6D, 0x51, 0xC2, 0x45, 0xE4, 0x85, 0xB5, 0x76, 0x62, 0x5E, 0x7E, 0xC6,
    0xF4, 0x4C, 0x42, 0xE9, 0xA6, 0x37, 0xED, 0x6B, 0x0B, 0xFF, 0x5C, 0xB6, 0xF4, 0x06, 0xB7, 0xED,
    0xEE, 0x38, 0x6B, 0xFB, 0x5A, 0x89, 0x9F, 0xA5, 0xAE, 0x9F, 0x24, 0x11, 0x7C, 0x4B, 0x1F, 0xE6,
    0x49, 0x28, 0x66, 0x51, 0xEC, 0xE4, 0x5B, 0x3D, 0xC2, 0x00, 0x7C, 0xB8, 0xA1, 0x63, 0xBF, 0x05,
    0x98, 0xDA, 0x48, 0x36, 0x1C, 0x55, 0xD3, 0x9A, 0x69, 0x16, 0x3F, 0xA8, 0xFD, 0x24, 0xCF, 0x5F,
    0x83, 0x65, 0x5D, 0x23, 0xDC, 0xA3, 0xAD, 0x96, 0x1C, 0x62, 0xF3, 0x56, 0x20, 0x85, 0x52, 0xBB,
    0x9E, 0xD5, 0x29, 0x07, 0x70, 0x96, 0x96, 0x6D, 0x67, 0x0C, 0x35, 0x4E, 0x4A, 0xBC, 0x98, 0x04,
    0xF1, 0x74, 0x6C, 0x08, 0xCA, 0x18, 0x21, 0x7C, 0x32, 0x90, 0x5E, 0x46, 0x2E, 0x36, 0xCE, 0x3B,
    0xE3, 0x9E, 0x77, 0x2C, 0x18, 0x0E, 0x86, 0x03, 0x9B, 0x27, 0x83, 0xA2, 0xEC, 0x07, 0xA2, 0x8F,
    0xB5, 0xC5, 0x5D, 0xF0, 0x6F, 0x4C, 0x52, 0xC9, 0xDE, 0x2B, 0xCB, 0xF6, 0x95, 0x58, 0x17, 0x18,
    0x39, 0x95, 0x49, 0x7C, 0xEA, 0x95, 0x6A, 0xE5, 0x15, 0xD2, 0x26, 0x18, 0x98, 0xFA, 0x05, 0x10,
    0x15, 0x72, 0x8E, 0x5A, 0x8A, 0xAC, 0xAA, 0x68, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// Prime modulus `p` and generator `g`, agreed out-of-band.
///
/// Construction validates the pair; a value of this type is always usable
/// for a session. Immutable and cheap to share across sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParameters {
    p: BigUint,
    g: BigUint,
    /// Order of the subgroup generated by `g`, when it is the prime `(p-1)/2`
    subgroup_order: Option<BigUint>,
    /// Byte length of `p`; every public value and secret is padded to this
    element_len: usize,
}

impl DomainParameters {
    /// Validate `(p, g)` against `config`.
    ///
    /// # Errors
    ///
    /// - `InvalidParameters`: If `p` is even, composite or shorter than
    ///   `config.min_modulus_bits`, if `g` is outside `[2, p-2]`, or if a safe
    ///   prime is required and `(p-1)/2` is composite
    pub fn new<R: RandomSource>(
        p: BigUint,
        g: BigUint,
        config: &AgreementConfig,
        rng: &R,
    ) -> CryptoResult<Self> {
        let bits = p.bits();
        if bits < config.min_modulus_bits {
            return Err(reject(format!(
                "modulus is {bits} bits, minimum is {}",
                config.min_modulus_bits
            )));
        }
        // Smallest modulus with a non-empty generator range [2, p-2]
        if p < BigUint::from(5u32) || (&p % 2u32).is_zero() {
            return Err(reject("modulus must be an odd prime of at least 5".to_string()));
        }
        if !is_probable_prime(&p, config.primality_rounds, rng) {
            return Err(reject("modulus is not prime".to_string()));
        }

        let p_minus_two = &p - 2u32;
        if g < BigUint::from(2u32) || g > p_minus_two {
            return Err(reject("generator must lie in [2, p-2]".to_string()));
        }

        let q = (&p - 1u32) >> 1u32;
        let q_is_prime = is_probable_prime(&q, config.primality_rounds, rng);
        if config.require_safe_prime && !q_is_prime {
            return Err(reject("modulus is not a safe prime".to_string()));
        }

        let subgroup_order = (q_is_prime && g.modpow(&q, &p).is_one()).then_some(q);

        tracing::debug!(
            modulus_bits = bits,
            prime_order_subgroup = subgroup_order.is_some(),
            "validated domain parameters"
        );

        Ok(Self::from_trusted(p, g, subgroup_order))
    }

    /// Validate `(p, g)` given as big-endian byte strings.
    pub fn from_be_bytes<R: RandomSource>(
        p: &[u8],
        g: &[u8],
        config: &AgreementConfig,
        rng: &R,
    ) -> CryptoResult<Self> {
        Self::new(BigUint::from_bytes_be(p), BigUint::from_bytes_be(g), config, rng)
    }

    /// The 2048-bit MODP group from RFC 3526 (group 14), generator 2.
    ///
    /// Well-known safe prime where 2 generates the prime-order subgroup, so
    /// no runtime primality test is performed.
    pub fn rfc3526_group14() -> Self {
        let p = BigUint::from_bytes_be(&RFC3526_GROUP14_PRIME);
        let q = (&p - 1u32) >> 1u32;
        Self::from_trusted(p, BigUint::from(2u32), Some(q))
    }

    fn from_trusted(p: BigUint, g: BigUint, subgroup_order: Option<BigUint>) -> Self {
        let element_len = p.bits().div_ceil(8) as usize;
        Self { p, g, subgroup_order, element_len }
    }

    /// Prime modulus.
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// Generator.
    pub fn generator(&self) -> &BigUint {
        &self.g
    }

    /// Prime order of the subgroup generated by `g`, if known.
    pub fn subgroup_order(&self) -> Option<&BigUint> {
        self.subgroup_order.as_ref()
    }

    /// Size of `p` in bits.
    pub fn modulus_bits(&self) -> u64 {
        self.p.bits()
    }

    /// Fixed byte length of encoded group elements.
    pub fn element_len(&self) -> usize {
        self.element_len
    }

    /// Multiple of the order of every value exponentiated in a session: `q`
    /// when the subgroup is known (peers are confined to it), else `p-1`.
    pub(crate) fn exponent_period(&self) -> BigUint {
        match &self.subgroup_order {
            Some(q) => q.clone(),
            None => &self.p - 1u32,
        }
    }

    /// Encode a group element big-endian, left-padded to [`Self::element_len`].
    pub(crate) fn encode_element(&self, value: &BigUint) -> Vec<u8> {
        let raw = value.to_bytes_be();
        let mut out = vec![0u8; self.element_len];
        // to_bytes_be() of zero is [0]; elements are always < p so never longer
        let start = self.element_len.saturating_sub(raw.len());
        out[start..].copy_from_slice(&raw[raw.len().saturating_sub(self.element_len)..]);
        out
    }

    /// Check that `y` is a usable peer public value.
    ///
    /// Rejects the degenerate elements 0, 1 and p-1, anything outside the
    /// group, and (when the subgroup order is known) elements outside the
    /// prime-order subgroup, closing off small-subgroup confinement.
    pub(crate) fn check_public_element(&self, y: &BigUint) -> Result<(), &'static str> {
        if *y < BigUint::from(2u32) || *y > &self.p - 2u32 {
            return Err("value outside [2, p-2]");
        }
        if let Some(q) = &self.subgroup_order
            && !y.modpow(q, &self.p).is_one()
        {
            return Err("value outside the prime-order subgroup");
        }
        Ok(())
    }
}

fn reject(reason: String) -> CryptoError {
    tracing::warn!(%reason, "rejected domain parameters");
    CryptoError::InvalidParameters { reason }
}
