//! AES-256-CBC envelopes authenticated with HMAC-SHA256
//!
//! Encrypt-then-MAC. The session key is split into an encryption subkey and
//! an authentication subkey; the envelope is
//! `base64(IV || ciphertext || tag)` where the tag covers IV and ciphertext.
//! Decryption verifies the tag before the ciphertext is decrypted or its
//! padding inspected, so a modified, truncated or spliced envelope never
//! yields plaintext.

use ::cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};

use super::CipherEnvelope;
use crate::{
    agreement::{DERIVED_KEY_SIZE, DerivedKey},
    encoding,
    env::RandomSource,
    error::{CryptoError, CryptoResult},
    mac::{self, AuthTag, TAG_SIZE},
};

type Aes256CbcEnc = ::cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = ::cbc::Decryptor<aes::Aes256>;

/// AES block size, which is also the IV size
pub const BLOCK_SIZE: usize = 16;

/// HKDF label for the AES subkey
const ENCRYPTION_LABEL: &[u8] = b"keyseal cbc encryption";

/// HKDF label for the HMAC subkey
const AUTHENTICATION_LABEL: &[u8] = b"keyseal hmac authentication";

/// IV, one padded block and the tag
const MIN_ENVELOPE_LEN: usize = 2 * BLOCK_SIZE + TAG_SIZE;

/// Independent encryption and authentication subkeys of one session key.
#[derive(Clone)]
pub(crate) struct CbcHmacKeys {
    encryption: DerivedKey,
    authentication: DerivedKey,
}

impl CbcHmacKeys {
    pub(crate) fn split(session_key: &DerivedKey) -> Self {
        Self {
            encryption: session_key.expand(ENCRYPTION_LABEL),
            authentication: session_key.expand(AUTHENTICATION_LABEL),
        }
    }

    pub(crate) fn seal<R: RandomSource>(&self, plaintext: &[u8], rng: &R) -> CipherEnvelope {
        let iv: [u8; BLOCK_SIZE] = rng.random_array();
        let ciphertext = encrypt_blocks(self.encryption.as_bytes(), &iv, plaintext);

        let mut envelope = Vec::with_capacity(BLOCK_SIZE + ciphertext.len() + TAG_SIZE);
        envelope.extend_from_slice(&iv);
        envelope.extend_from_slice(&ciphertext);
        let tag = mac::tag(self.authentication.as_bytes(), envelope.as_slice());
        envelope.extend_from_slice(tag.as_bytes());

        CipherEnvelope(encoding::encode(&envelope))
    }

    pub(crate) fn open(&self, envelope: &CipherEnvelope) -> CryptoResult<Vec<u8>> {
        let raw = encoding::decode(envelope.as_str()).map_err(|_| CryptoError::DecryptionFailed)?;
        if raw.len() < MIN_ENVELOPE_LEN || (raw.len() - TAG_SIZE) % BLOCK_SIZE != 0 {
            return Err(CryptoError::DecryptionFailed);
        }

        let (authenticated, tag) = raw.split_at(raw.len() - TAG_SIZE);
        let Ok(tag) = <[u8; TAG_SIZE]>::try_from(tag) else {
            return Err(CryptoError::DecryptionFailed);
        };
        if !mac::verify(self.authentication.as_bytes(), &AuthTag::from_bytes(tag), authenticated) {
            return Err(CryptoError::DecryptionFailed);
        }

        let (iv, ciphertext) = authenticated.split_at(BLOCK_SIZE);
        decrypt_blocks(self.encryption.as_bytes(), iv, ciphertext)
    }
}

/// Encrypt `plaintext` under `key` with a fresh random IV, then tag it.
///
/// The plaintext is always padded, so the ciphertext is one to sixteen bytes
/// longer: an empty plaintext becomes one full block of padding.
///
/// # Security
///
/// - IV is drawn fresh from `rng` for every call; never reused under a key
/// - Caller MUST provide a cryptographically secure source in production
/// - Encryption and tagging use separate subkeys derived from `key`
pub fn encrypt<R: RandomSource>(plaintext: &[u8], key: &DerivedKey, rng: &R) -> CipherEnvelope {
    CbcHmacKeys::split(key).seal(plaintext, rng)
}

/// Verify and decrypt an envelope produced by [`encrypt`].
///
/// # Errors
///
/// - `DecryptionFailed`: If the envelope is not valid base64, is too short
///   or misaligned, carries a tag that does not verify, or has invalid
///   padding. The error does not say which check failed.
pub fn decrypt(envelope: &CipherEnvelope, key: &DerivedKey) -> CryptoResult<Vec<u8>> {
    CbcHmacKeys::split(key).open(envelope)
}

fn encrypt_blocks(
    key: &[u8; DERIVED_KEY_SIZE],
    iv: &[u8; BLOCK_SIZE],
    plaintext: &[u8],
) -> Vec<u8> {
    Aes256CbcEnc::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

fn decrypt_blocks(
    key: &[u8; DERIVED_KEY_SIZE],
    iv: &[u8],
    ciphertext: &[u8],
) -> CryptoResult<Vec<u8>> {
    let Ok(iv) = <&[u8; BLOCK_SIZE]>::try_from(iv) else {
        return Err(CryptoError::DecryptionFailed);
    };

    Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::OsRandom;

    /// Replays a fixed IV so ciphertexts are reproducible.
    struct FixedIv([u8; BLOCK_SIZE]);

    impl RandomSource for FixedIv {
        fn fill_random(&self, buffer: &mut [u8]) {
            for (i, byte) in buffer.iter_mut().enumerate() {
                *byte = self.0[i % BLOCK_SIZE];
            }
        }
    }

    fn test_key() -> DerivedKey {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        DerivedKey::from_bytes(key)
    }

    fn counting_iv() -> [u8; BLOCK_SIZE] {
        let mut iv = [0u8; BLOCK_SIZE];
        for (i, byte) in iv.iter_mut().enumerate() {
            *byte = i as u8;
        }
        iv
    }

    fn raw(envelope: &CipherEnvelope) -> Vec<u8> {
        encoding::decode(envelope.as_str()).unwrap()
    }

    fn rewrap(raw: &[u8]) -> CipherEnvelope {
        CipherEnvelope::new(encoding::encode(raw))
    }

    #[test]
    fn nist_sp800_38a_first_block() {
        // F.2.5 CBC-AES256.Encrypt, block 1, followed by a full padding block
        let key: [u8; 32] =
            hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4")
                .unwrap()
                .try_into()
                .unwrap();
        let plaintext = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();

        let ciphertext = encrypt_blocks(&key, &counting_iv(), &plaintext);

        assert_eq!(hex::encode(&ciphertext[..16]), "f58c4c04d6e5f1ba779eabfb5f7bfbd6");
        assert_eq!(
            decrypt_blocks(&key, &counting_iv(), &ciphertext).unwrap(),
            plaintext
        );
    }

    #[test]
    fn envelope_known_answer() {
        let envelope = encrypt(b"hello", &test_key(), &FixedIv(counting_iv()));

        assert_eq!(
            envelope.as_str(),
            "AAECAwQFBgcICQoLDA0ODxSf/ja/O9zQfKT7gqmafHsunLAJQJnBvWMipz8b2W6rNyUnfT6mW7qtyzBHEfwy6w=="
        );
        assert_eq!(decrypt(&envelope, &test_key()).unwrap(), b"hello");
    }

    #[test]
    fn subkeys_are_independent() {
        let key = test_key();
        let keys = CbcHmacKeys::split(&key);

        assert_ne!(keys.encryption, key);
        assert_ne!(keys.authentication, key);
        assert_ne!(keys.encryption, keys.authentication);
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = test_key();
        let envelope = encrypt(b"hello", &key, &OsRandom);

        assert_eq!(decrypt(&envelope, &key).unwrap(), b"hello");
    }

    #[test]
    fn empty_plaintext_pads_to_one_block() {
        let key = test_key();
        let envelope = encrypt(b"", &key, &OsRandom);

        assert_eq!(raw(&envelope).len(), MIN_ENVELOPE_LEN);
        assert_eq!(decrypt(&envelope, &key).unwrap(), b"");
    }

    #[test]
    fn padding_boundaries() {
        let key = test_key();

        // One short of a block fills it; a full block gets a whole extra block
        for (len, expected_blocks) in [(15, 1), (16, 2), (17, 2), (31, 2), (32, 3)] {
            let plaintext = vec![0x42u8; len];
            let envelope = encrypt(&plaintext, &key, &OsRandom);

            assert_eq!(
                raw(&envelope).len(),
                BLOCK_SIZE * (1 + expected_blocks) + TAG_SIZE,
                "len {len}"
            );
            assert_eq!(decrypt(&envelope, &key).unwrap(), plaintext);
        }
    }

    #[test]
    fn same_plaintext_produces_different_envelopes() {
        let key = test_key();

        let first = encrypt(b"repeat", &key, &OsRandom);
        let second = encrypt(b"repeat", &key, &OsRandom);

        assert_ne!(first, second);
    }

    #[test]
    fn iv_bit_flip_is_rejected() {
        let key = test_key();
        let mut bytes = raw(&encrypt(b"pay 10", &key, &OsRandom));

        // Unauthenticated CBC would decrypt this to "pay 90"
        bytes[4] ^= b'1' ^ b'9';

        assert!(matches!(decrypt(&rewrap(&bytes), &key), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn dropped_leading_block_is_rejected() {
        let key = test_key();
        let bytes = raw(&encrypt(b"transfer 10 coins to bob, memo: rent", &key, &OsRandom));

        // Still well-formed CBC: the old first ciphertext block becomes the IV
        let shortened = rewrap(&bytes[BLOCK_SIZE..]);

        assert!(matches!(decrypt(&shortened, &key), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn malformed_envelopes_fail_opaquely() {
        let key = test_key();
        let valid = raw(&encrypt(b"payload", &key, &OsRandom));

        let cases = [
            CipherEnvelope::new("***not base64***"),
            CipherEnvelope::new(""),
            // IV only, no ciphertext
            rewrap(&valid[..BLOCK_SIZE]),
            // Tag stripped
            rewrap(&valid[..valid.len() - TAG_SIZE]),
            // Not block-aligned
            rewrap(&valid[..valid.len() - 1]),
            // Right shape, zero tag
            rewrap(&[0u8; MIN_ENVELOPE_LEN]),
        ];

        for envelope in &cases {
            assert!(
                matches!(decrypt(envelope, &key), Err(CryptoError::DecryptionFailed)),
                "{envelope} must fail"
            );
        }
    }

    #[test]
    fn wrong_key_fails() {
        let envelope = encrypt(b"secret message", &test_key(), &OsRandom);

        let wrong = DerivedKey::from_bytes([0xFF; 32]);
        assert!(matches!(decrypt(&envelope, &wrong), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn bad_padding_behind_valid_tag_fails() {
        let keys = CbcHmacKeys::split(&test_key());

        // Last plaintext byte 0x00 is never valid PKCS#7 padding
        let iv = counting_iv();
        let mut block = [0u8; BLOCK_SIZE];
        Aes256CbcEnc::new(keys.encryption.as_bytes().into(), (&iv).into())
            .encrypt_block_mut((&mut block).into());

        let mut body = iv.to_vec();
        body.extend_from_slice(&block);
        let tag = mac::tag(keys.authentication.as_bytes(), body.as_slice());
        body.extend_from_slice(tag.as_bytes());

        assert!(matches!(keys.open(&rewrap(&body)), Err(CryptoError::DecryptionFailed)));
    }
}
