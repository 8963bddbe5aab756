//! Fuzz target for peer public value validation
//!
//! # Strategy
//!
//! - Arbitrary strings as the exported peer value
//! - Arbitrary group elements in the small safe-prime group p = 2039
//!
//! # Invariants
//!
//! - `compute_shared_key` never panics
//! - A rejected value leaves the session in `Initialized`
//! - Accepted values lie in [2, p-2] and in the order-q subgroup

#![no_main]

use arbitrary::Arbitrary;
use keyseal_crypto::{
    encoding, AgreementConfig, AgreementState, DomainParameters, KeyAgreement, OsRandom,
};
use libfuzzer_sys::fuzz_target;
use num_bigint::BigUint;

const P: u32 = 2039;
const Q: u32 = 1019;

#[derive(Debug, Arbitrary)]
enum PeerInput {
    Text(String),
    Element(u16),
}

fuzz_target!(|input: PeerInput| {
    let config = AgreementConfig { min_modulus_bits: 0, ..AgreementConfig::default() };
    let params =
        DomainParameters::new(BigUint::from(P), BigUint::from(2u32), &config, &OsRandom)
            .expect("2039 is a safe prime");

    let mut session = KeyAgreement::new(params, &OsRandom);

    let (encoded, element) = match input {
        PeerInput::Text(text) => (text, None),
        PeerInput::Element(value) => (encoding::encode(&value.to_be_bytes()), Some(value)),
    };

    match session.compute_shared_key(&encoded) {
        Ok(_key) => {
            assert_eq!(session.state(), AgreementState::SecretComputed);
            if let Some(value) = element {
                let y = BigUint::from(value);
                assert!((2..=P - 2).contains(&u32::from(value)));
                assert_eq!(y.modpow(&BigUint::from(Q), &BigUint::from(P)), BigUint::from(1u32));
            }
        },
        Err(e) => {
            assert!(e.is_fatal(), "peer rejection must be fatal: {e:?}");
            assert_eq!(session.state(), AgreementState::Initialized);
        },
    }
});
