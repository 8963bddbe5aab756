//! Randomness abstraction for deterministic testing.
//!
//! Decouples the protocol from the entropy source. Production code uses
//! [`OsRandom`]; tests can supply seeded or fixed sources so that private
//! exponents and initialization values are reproducible.

use rand::{RngCore, rngs::OsRng};

/// Source of random bytes for key generation and per-message nonces.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `fill_random()` uses cryptographically secure entropy in production
/// - Two calls never return correlated output (IV uniqueness depends on it)
/// - The method is infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion)
pub trait RandomSource: Send + Sync {
    /// Fills the provided buffer with random bytes.
    fn fill_random(&self, buffer: &mut [u8]);

    /// Returns a fixed-size array of random bytes.
    fn random_array<const N: usize>(&self) -> [u8; N]
    where
        Self: Sized,
    {
        let mut bytes = [0u8; N];
        self.fill_random(&mut bytes);
        bytes
    }
}

/// Operating system entropy.
///
/// Stateless and process-wide: every call reads from the OS RNG, so a single
/// value can be shared freely across threads and needs no teardown.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_random(&self, buffer: &mut [u8]) {
        OsRng.fill_bytes(buffer);
    }
}
