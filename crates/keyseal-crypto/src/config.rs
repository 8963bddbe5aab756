//! Key agreement configuration

use serde::Deserialize;

/// Default minimum modulus size in bits
pub const DEFAULT_MIN_MODULUS_BITS: u64 = 2048;

/// Default number of random-base Miller-Rabin rounds
pub const DEFAULT_PRIMALITY_ROUNDS: u32 = 24;

/// Policy applied when validating caller-supplied domain parameters.
///
/// The parameters themselves are distributed out-of-band; this only
/// controls how strictly they are checked before a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgreementConfig {
    /// Reject moduli shorter than this many bits
    pub min_modulus_bits: u64,
    /// Miller-Rabin rounds for `p` (and `q` when a safe prime is required)
    pub primality_rounds: u32,
    /// Require `p = 2q + 1` with `q` prime
    pub require_safe_prime: bool,
}

impl Default for AgreementConfig {
    fn default() -> Self {
        Self {
            min_modulus_bits: DEFAULT_MIN_MODULUS_BITS,
            primality_rounds: DEFAULT_PRIMALITY_ROUNDS,
            require_safe_prime: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = AgreementConfig::default();
        assert_eq!(config.min_modulus_bits, 2048);
        assert_eq!(config.primality_rounds, 24);
        assert!(config.require_safe_prime);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: AgreementConfig =
            serde_json::from_str(r#"{"min_modulus_bits": 3072}"#).unwrap();

        assert_eq!(config.min_modulus_bits, 3072);
        assert_eq!(config.primality_rounds, DEFAULT_PRIMALITY_ROUNDS);
        assert!(config.require_safe_prime);
    }

    #[test]
    fn empty_config_is_default() {
        let config: AgreementConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AgreementConfig::default());
    }
}
