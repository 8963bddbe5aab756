//! Keyed message authentication with HMAC-SHA256
//!
//! # Canonical bytes
//!
//! Tags are computed over a message's canonical byte form, defined by
//! [`MessageLike`]:
//!
//! - Byte messages are used as-is.
//! - Structured messages are converted to a JSON value and rendered as
//!   compact UTF-8 JSON: object keys sorted by byte order, no whitespace
//!   between tokens, numbers and string escapes as `serde_json` prints them.
//!   Struct field declaration order does not matter.
//!
//! A byte message holding exactly that canonical text therefore tags the
//! same as the structured message, so a receiver can verify the wire bytes
//! directly.

use std::{borrow::Cow, collections::BTreeMap, fmt};

use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{
    encoding,
    error::{CryptoError, CryptoResult},
};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 output size (32 bytes)
pub const TAG_SIZE: usize = 32;

/// A message in canonical byte form, ready to be tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLike<'a>(Cow<'a, [u8]>);

impl<'a> MessageLike<'a> {
    /// Borrow raw bytes as a message.
    pub fn bytes(bytes: &'a [u8]) -> Self {
        Self(Cow::Borrowed(bytes))
    }

    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// - `Canonicalization`: If the value cannot be represented as JSON
    ///   (e.g. a map with non-string keys)
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> CryptoResult<MessageLike<'static>> {
        let value = serde_json::to_value(value)
            .map_err(|e| CryptoError::Canonicalization { reason: e.to_string() })?;
        Ok(MessageLike::from(value))
    }

    /// Canonical bytes that are fed to the MAC.
    pub fn canonical_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl<'a> From<&'a [u8]> for MessageLike<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for MessageLike<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Self::bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for MessageLike<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::bytes(bytes)
    }
}

impl From<Value> for MessageLike<'static> {
    fn from(value: Value) -> Self {
        // Display of a Value is compact JSON in map iteration order
        Self(Cow::Owned(sort_keys(value).to_string().into_bytes()))
    }
}

/// Rebuild every object with keys inserted in sorted order.
///
/// Keeps the canonical form stable even if `serde_json`'s `preserve_order`
/// feature is enabled elsewhere in the dependency graph.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        },
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// A 32-byte HMAC-SHA256 tag.
///
/// Equality is constant-time.
#[derive(Clone)]
pub struct AuthTag([u8; TAG_SIZE]);

impl AuthTag {
    /// Wrap raw tag bytes.
    pub fn from_bytes(bytes: [u8; TAG_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw tag bytes.
    pub fn as_bytes(&self) -> &[u8; TAG_SIZE] {
        &self.0
    }

    /// Transport form (base64).
    pub fn to_base64(&self) -> String {
        encoding::encode(&self.0)
    }

    /// Parse the transport form.
    ///
    /// # Errors
    ///
    /// - `Decoding`: If the input is not valid base64
    /// - `InvalidLength`: If it does not decode to exactly 32 bytes
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = encoding::decode(encoded)?;
        let actual = bytes.len();
        let tag: [u8; TAG_SIZE] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidLength { expected: TAG_SIZE, actual })?;
        Ok(Self(tag))
    }
}

impl PartialEq for AuthTag {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}

impl Eq for AuthTag {}

impl fmt::Debug for AuthTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthTag({})", hex::encode(&self.0[..8]))
    }
}

/// Compute the tag of `message` under `key`.
///
/// Any key length is accepted, including empty.
pub fn tag<'m>(key: &[u8], message: impl Into<MessageLike<'m>>) -> AuthTag {
    let mac = keyed(key, &message.into());
    AuthTag(mac.finalize().into_bytes().into())
}

/// Check `candidate` against the tag of `message` under `key`.
///
/// Returns `false` on mismatch; a wrong tag is an expected outcome, not an
/// error. The comparison runs in constant time.
pub fn verify<'m>(key: &[u8], candidate: &AuthTag, message: impl Into<MessageLike<'m>>) -> bool {
    keyed(key, &message.into()).verify_slice(candidate.as_bytes()).is_ok()
}

fn keyed(key: &[u8], message: &MessageLike<'_>) -> HmacSha256 {
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        unreachable!("HMAC-SHA256 accepts any key size");
    };
    mac.update(message.canonical_bytes());
    mac
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rfc4231_test_case_2() {
        let tag = tag(b"Jefe", b"what do ya want for nothing?");

        assert_eq!(
            hex::encode(tag.as_bytes()),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn tag_then_verify() {
        let key = [0x11u8; 32];
        let tag = tag(&key, b"payload");

        assert!(verify(&key, &tag, b"payload"));
    }

    #[test]
    fn uses_supplied_key() {
        let message = b"same message";

        assert_ne!(tag(b"key-one", message), tag(b"key-two", message));
        assert_ne!(tag(b"key", message), tag(b"other", message));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let k1 = [0x01u8; 32];
        let k2 = [0x02u8; 32];
        let message = MessageLike::from(json!({"seq": 1, "op": "ping"}));

        let tag = tag(&k1, message.clone());
        assert!(!verify(&k2, &tag, message));
    }

    #[test]
    fn modified_message_fails_verification() {
        let key = [0x33u8; 32];
        let tag = tag(&key, b"transfer 10");

        assert!(!verify(&key, &tag, b"transfer 11"));
        assert!(!verify(&key, &tag, b"transfer 10 "));
        assert!(!verify(&key, &tag, b""));
    }

    #[test]
    fn empty_key_and_message_are_valid() {
        let tag = tag(b"", b"");
        assert!(verify(b"", &tag, b""));
    }

    #[test]
    fn canonical_form_sorts_keys_and_strips_whitespace() {
        let message = MessageLike::from(json!({"seq": 1, "op": "ping"}));
        let text = std::str::from_utf8(message.canonical_bytes()).unwrap();

        insta::assert_snapshot!(text, @r#"{"op":"ping","seq":1}"#);
    }

    #[test]
    fn nested_structures_are_canonical() {
        let message = MessageLike::from(json!({
            "z": [3, {"b": true, "a": null}],
            "a": {"y": "two words", "x": -1.5}
        }));
        let text = std::str::from_utf8(message.canonical_bytes()).unwrap();

        insta::assert_snapshot!(text, @r#"{"a":{"x":-1.5,"y":"two words"},"z":[3,{"a":null,"b":true}]}"#);
    }

    #[test]
    fn struct_field_order_does_not_matter() {
        #[derive(Serialize)]
        struct SeqFirst {
            seq: u32,
            op: &'static str,
        }

        #[derive(Serialize)]
        struct OpFirst {
            op: &'static str,
            seq: u32,
        }

        let a = MessageLike::structured(&SeqFirst { seq: 1, op: "ping" }).unwrap();
        let b = MessageLike::structured(&OpFirst { op: "ping", seq: 1 }).unwrap();

        assert_eq!(a, b);
        assert_eq!(tag(b"k", a), tag(b"k", b));
    }

    #[test]
    fn canonical_text_tags_like_structured_value() {
        let key = b"shared";
        let structured = MessageLike::from(json!({"seq": 1, "op": "ping"}));
        let wire = br#"{"op":"ping","seq":1}"#;

        assert!(verify(key, &tag(key, structured), wire));
    }

    #[test]
    fn non_string_map_keys_fail_canonicalization() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "value");

        let result = MessageLike::structured(&map);
        assert!(matches!(result, Err(CryptoError::Canonicalization { .. })));
    }

    #[test]
    fn tag_transport_roundtrip_and_errors() {
        let tag = tag(b"k", b"m");
        let parsed = AuthTag::from_base64(&tag.to_base64()).unwrap();
        assert_eq!(parsed, tag);

        assert!(matches!(AuthTag::from_base64("!!"), Err(CryptoError::Decoding(_))));
        assert!(matches!(
            AuthTag::from_base64("AAAA"),
            Err(CryptoError::InvalidLength { expected: 32, actual: 3 })
        ));
    }

    #[test]
    fn flipped_tag_bit_never_verifies() {
        let key = b"k";
        let mut bytes = *tag(key, b"m").as_bytes();
        bytes[31] ^= 0x80;

        assert!(!verify(key, &AuthTag::from_bytes(bytes), b"m"));
    }
}
