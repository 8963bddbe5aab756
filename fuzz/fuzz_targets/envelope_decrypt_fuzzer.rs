//! Fuzz target for envelope decryption
//!
//! Feeds attacker-controlled envelopes to every decryption path.
//!
//! # Strategy
//!
//! - Raw strings (invalid base64, whitespace, padding errors)
//! - Well-formed base64 of arbitrary bytes and lengths
//! - Genuine envelopes with a single flipped bit
//!
//! # Invariants
//!
//! - Decryption never panics
//! - Every failure is the opaque `DecryptionFailed`
//! - Tampered envelopes never open, for either construction
//! - Untampered envelopes always round-trip

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use keyseal_crypto::{
    decrypt, decrypt_aead, encoding, encrypt, encrypt_aead, CipherEnvelope, CryptoError,
    DerivedKey, RandomSource, SecureChannel,
};

struct FuzzRandom([u8; 24]);

impl RandomSource for FuzzRandom {
    fn fill_random(&self, buffer: &mut [u8]) {
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = self.0[i % self.0.len()];
        }
    }
}

#[derive(Debug, Arbitrary)]
enum EnvelopeInput {
    /// Arbitrary text, mostly not valid base64
    Text(String),
    /// Valid base64 of arbitrary bytes
    Bytes(Vec<u8>),
    /// Real envelope with one bit flipped
    Flipped { plaintext: Vec<u8>, position: u16, bit: u8 },
}

#[derive(Debug, Arbitrary)]
struct EnvelopeScenario {
    key: [u8; 32],
    nonce: [u8; 24],
    input: EnvelopeInput,
}

fn assert_opaque(result: Result<Vec<u8>, CryptoError>) {
    if let Err(e) = result {
        assert!(matches!(e, CryptoError::DecryptionFailed), "leaked error detail: {e:?}");
    }
}

fuzz_target!(|scenario: EnvelopeScenario| {
    let key = DerivedKey::from_bytes(scenario.key);
    let rng = FuzzRandom(scenario.nonce);

    match scenario.input {
        EnvelopeInput::Text(text) => {
            let envelope = CipherEnvelope::new(text);
            assert_opaque(decrypt(&envelope, &key));
            assert_opaque(decrypt_aead(&envelope, &key));
        },
        EnvelopeInput::Bytes(bytes) => {
            let envelope = CipherEnvelope::new(encoding::encode(&bytes));
            assert_opaque(decrypt(&envelope, &key));
            assert_opaque(decrypt_aead(&envelope, &key));
        },
        EnvelopeInput::Flipped { plaintext, position, bit } => {
            let channel = SecureChannel::new(&key);
            let sealed = channel.seal(&plaintext, &rng);
            assert_eq!(decrypt(&sealed, &key).expect("untampered CBC envelope"), plaintext);

            let cbc = encrypt(&plaintext, &key, &rng);
            assert_eq!(channel.open(&cbc).expect("untampered CBC envelope"), plaintext);

            let aead = encrypt_aead(&plaintext, &key, &rng);
            assert_eq!(decrypt_aead(&aead, &key).expect("untampered AEAD envelope"), plaintext);

            for envelope in [&cbc, &aead] {
                let mut raw = encoding::decode(envelope.as_str()).expect("own envelope is base64");
                let i = usize::from(position) % raw.len();
                raw[i] ^= 1 << (bit % 8);
                let tampered = CipherEnvelope::new(encoding::encode(&raw));

                let results = [decrypt(&tampered, &key), decrypt_aead(&tampered, &key)];
                for result in results {
                    assert!(
                        matches!(result, Err(CryptoError::DecryptionFailed)),
                        "tampered envelope opened or leaked detail: {result:?}"
                    );
                }
            }
        },
    }
});
