//! Exponent blinding and in-place clearing of secret big integers
//!
//! `BigUint::modpow` runs in time that depends on the exponent's bits. Each
//! exponentiation is therefore given `x + r·n` instead of `x`, where `n` is a
//! multiple of the base's order and `r` is fresh 64-bit randomness: the
//! result is unchanged, but the bit pattern fed to `modpow` differs on every
//! use and never equals the long-term exponent.

use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::env::RandomSource;

/// Width of the random blinding factor
const BLINDING_BYTES: usize = 8;

/// Return `exponent + r·period` for a fresh random `r`.
///
/// `period` must be a multiple of the order of every base the result is
/// used with.
pub(crate) fn blind<R: RandomSource>(exponent: &BigUint, period: &BigUint, rng: &R) -> BigUint {
    let factor = Zeroizing::new(rng.random_array::<BLINDING_BYTES>());
    let mut r = BigUint::from_bytes_be(&*factor);
    let mut mask = &r * period;

    let blinded = exponent + &mask;
    wipe(&mut r);
    wipe(&mut mask);
    blinded
}

/// Overwrite `value` with zero without releasing a buffer that still holds
/// secret digits.
///
/// Bits are cleared from least to most significant, so by the time the top
/// digit empties and the vector may shrink, every digit is already zero.
pub(crate) fn wipe(value: &mut BigUint) {
    for bit in 0..value.bits() {
        value.set_bit(bit, false);
    }
}
