//! Probabilistic primality testing for domain parameter validation

use num_bigint::BigUint;
use num_traits::{One, Zero};
use zeroize::Zeroizing;

use super::blinding::wipe;
use crate::env::RandomSource;

/// Primes below 100, used for cheap trial division before Miller-Rabin.
const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Miller-Rabin probable-prime test with `rounds` random bases.
///
/// A composite passes with probability at most `4^-rounds`. Bases are drawn
/// from `rng` so an adversarially chosen modulus cannot target fixed bases.
pub(crate) fn is_probable_prime<R: RandomSource>(n: &BigUint, rounds: u32, rng: &R) -> bool {
    for &small in &SMALL_PRIMES {
        if *n == BigUint::from(small) {
            return true;
        }
        if (n % small).is_zero() {
            return false;
        }
    }
    // Only 1 reaches here below two
    if *n < BigUint::from(2u32) {
        return false;
    }

    let n_minus_one = n - 1u32;
    let Some(s) = n_minus_one.trailing_zeros() else {
        return false;
    };
    let d = &n_minus_one >> s;
    let two = BigUint::from(2u32);
    let max_base = n - 2u32;

    'witness: for _ in 0..rounds {
        let a = random_in_range(rng, &two, &max_base);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// Uniform-enough integer in `[low, high]` (inclusive).
///
/// Draws 64 bits more than the span needs before reducing, which keeps the
/// modulo bias below `2^-64`.
pub(crate) fn random_in_range<R: RandomSource>(rng: &R, low: &BigUint, high: &BigUint) -> BigUint {
    if high <= low {
        return low.clone();
    }

    let span = high - low + 1u32;
    let len = span.bits().div_ceil(8) as usize + 8;
    let mut buffer = Zeroizing::new(vec![0u8; len]);
    rng.fill_random(&mut buffer);

    let mut wide = BigUint::from_bytes_be(&buffer);
    let value = &wide % &span + low;
    wipe(&mut wide);
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::OsRandom;

    #[test]
    fn small_values() {
        let expected_primes = [2u32, 3, 5, 7, 97, 101, 1019, 2039];
        for p in expected_primes {
            assert!(is_probable_prime(&BigUint::from(p), 16, &OsRandom), "{p} is prime");
        }

        let composites = [0u32, 1, 4, 9, 91, 561, 1105, 2041, 10_403];
        for c in composites {
            assert!(!is_probable_prime(&BigUint::from(c), 16, &OsRandom), "{c} is composite");
        }
    }

    #[test]
    fn carmichael_numbers_rejected() {
        // Fermat pseudoprimes to every coprime base
        for c in [41_041u64, 825_265, 29_341, 340_561] {
            assert!(!is_probable_prime(&BigUint::from(c), 16, &OsRandom), "{c} is composite");
        }
    }

    #[test]
    fn large_semiprime_rejected() {
        // (2^61 - 1) * (2^31 - 1), both Mersenne primes
        let p = BigUint::from((1u64 << 61) - 1);
        let q = BigUint::from((1u64 << 31) - 1);
        assert!(is_probable_prime(&p, 16, &OsRandom));
        assert!(!is_probable_prime(&(p * q), 16, &OsRandom));
    }

    #[test]
    fn random_in_range_stays_in_bounds() {
        let low = BigUint::from(2u32);
        let high = BigUint::from(10u32);

        for _ in 0..200 {
            let v = random_in_range(&OsRandom, &low, &high);
            assert!(v >= low && v <= high);
        }
    }

    #[test]
    fn random_in_range_degenerate_span() {
        let low = BigUint::from(7u32);
        assert_eq!(random_in_range(&OsRandom, &low, &low), low);
    }
}
