//! Canonical serialization + SHA-256 hashing.
//!
//! Produces byte-identical output across platforms.
//!
//! Rules:
//!   - Fields in fixed insertion order (serde_json `preserve_order`)
//!   - Flags in registry declaration order, never sorted
//!   - Bits in their wire form (number for JSON-safe kinds, string otherwise)
//!   - UTF-8 JSON, no whitespace

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::bitfield::BitField;
use crate::bits::Bits;
use crate::registry::FlagRegistry;

/// Canonical encoding of a registry:
/// `{"kind":..,"default":..,"flags":[[name,bit],..]}`.
///
/// Two registries share this encoding exactly when a mask stored under one
/// means the same flags under the other.
pub fn canonical_registry<R: FlagRegistry>() -> Vec<u8> {
    let flags: Vec<Value> = R::FLAGS
        .iter()
        .map(|(name, bit)| Value::Array(vec![Value::String(name.to_string()), bit.to_json()]))
        .collect();

    let mut root = Map::new();
    root.insert("kind".to_string(), Value::String(R::KIND.to_string()));
    root.insert("default".to_string(), R::DEFAULT.to_json());
    root.insert("flags".to_string(), Value::Array(flags));
    encode(&Value::Object(root))
}

/// SHA-256 of `canonical_registry`. Lowercase hex string.
pub fn registry_fingerprint<R: FlagRegistry>() -> String {
    hex_digest(&canonical_registry::<R>())
}

/// Canonical encoding of a flag set:
/// `{"kind":..,"bits":..,"flags":{name:bool,..}}`.
pub fn canonical_serialize<R: FlagRegistry>(field: &BitField<R>) -> Vec<u8> {
    let flags: Map<String, Value> = field
        .serialize_flags()
        .into_iter()
        .map(|(name, set)| (name.to_string(), Value::Bool(set)))
        .collect();

    let mut root = Map::new();
    root.insert("kind".to_string(), Value::String(R::KIND.to_string()));
    root.insert("bits".to_string(), field.to_json());
    root.insert("flags".to_string(), Value::Object(flags));
    encode(&Value::Object(root))
}

/// SHA-256 of `canonical_serialize`. Lowercase hex string.
pub fn canonical_hash<R: FlagRegistry>(field: &BitField<R>) -> String {
    hex_digest(&canonical_serialize(field))
}

fn encode(value: &Value) -> Vec<u8> {
    value.to_string().into_bytes()
}

/// SHA-256 of `bytes`. Lowercase hex string.
pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
