//! Stored-mask codec — deterministic encoder/decoder for persisted masks.
//!
//! A stored mask pairs a bitfield's wire form with the kind and registry
//! fingerprint it was written under, so a loader can refuse masks whose
//! bits no longer mean the same flags.
//!
//! - `capture`:        BitField → StoredMask
//! - `encode_mask`:    BitField → canonical JSON string
//! - `decode_mask`:    JSON string → StoredMask (strict, no defaults)
//! - `restore_mask`:   decode + registry, kind and fingerprint validation
//! - `export_mask_to_file` / `import_mask_from_file`: file I/O
//! - `mask_hash`:      SHA-256 of the encoded JSON (lowercase hex)

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use bitfield_core::hashing::{hex_digest, registry_fingerprint};
use bitfield_core::invariants::{try_validate_registry, RegistryViolation};
use bitfield_core::{BitField, BitFieldError, FlagRegistry, Resolvable};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// All possible stored-mask codec failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// JSON serialization failed.
    #[error("SerializationError: {0}")]
    SerializationError(String),
    /// JSON deserialization failed (malformed, missing fields, unknown fields).
    #[error("DeserializationError: {0}")]
    DeserializationError(String),
    /// Mask was written for a different flag kind.
    #[error("KindMismatch: expected {expected:?}, found {found:?}")]
    KindMismatch { expected: &'static str, found: String },
    /// Registry changed since the mask was written.
    #[error("FingerprintMismatch: {kind} registry is {expected}, mask was written under {found}")]
    FingerprintMismatch {
        kind: &'static str,
        expected: String,
        found: String,
    },
    /// The registry itself is malformed.
    #[error("RegistryViolation: {0}")]
    RegistryViolation(#[from] RegistryViolation),
    /// The stored bits do not resolve.
    #[error("InvalidResolvable: {0}")]
    InvalidResolvable(#[from] BitFieldError),
    /// File I/O error.
    #[error("IoError: {0}")]
    IoError(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// Stored form
// ---------------------------------------------------------------------------

/// On-disk form of one mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredMask {
    /// Registry kind the mask belongs to.
    pub kind: String,
    /// `registry_fingerprint` at write time.
    pub fingerprint: String,
    /// The bitfield's wire form.
    pub bits: Value,
}

/// Capture a bitfield with its kind and registry fingerprint.
pub fn capture<R: FlagRegistry>(field: &BitField<R>) -> StoredMask {
    StoredMask {
        kind: R::KIND.to_string(),
        fingerprint: registry_fingerprint::<R>(),
        bits: field.to_json(),
    }
}

// ---------------------------------------------------------------------------
// Encoder / decoder
// ---------------------------------------------------------------------------

/// Encode a bitfield to a canonical JSON string.
///
/// Field order is fixed by `StoredMask`. No whitespace, no timestamps.
pub fn encode_mask<R: FlagRegistry>(field: &BitField<R>) -> Result<String, SnapshotError> {
    serde_json::to_string(&capture(field))
        .map_err(|e| SnapshotError::SerializationError(e.to_string()))
}

/// Decode a JSON string into a StoredMask.
///
/// Strict: unknown fields and missing fields fail. No registry checks;
/// use `restore_mask` for validated loading.
pub fn decode_mask(json: &str) -> Result<StoredMask, SnapshotError> {
    serde_json::from_str::<StoredMask>(json)
        .map_err(|e| SnapshotError::DeserializationError(e.to_string()))
}

// ---------------------------------------------------------------------------
// Restore (decode + validate)
// ---------------------------------------------------------------------------

/// Decode a JSON string and rebuild the bitfield under registry `R`.
///
/// Checks, in order: registry well-formedness, kind, fingerprint, then
/// resolution of the stored bits. The result is always mutable.
pub fn restore_mask<R: FlagRegistry>(json: &str) -> Result<BitField<R>, SnapshotError> {
    let stored = decode_mask(json)?;
    try_validate_registry::<R>()?;

    if stored.kind != R::KIND {
        tracing::warn!(expected = R::KIND, found = %stored.kind, "stored mask kind mismatch");
        return Err(SnapshotError::KindMismatch {
            expected: R::KIND,
            found: stored.kind,
        });
    }

    let expected = registry_fingerprint::<R>();
    if stored.fingerprint != expected {
        tracing::warn!(
            kind = R::KIND,
            expected = %expected,
            found = %stored.fingerprint,
            "stored mask fingerprint mismatch"
        );
        return Err(SnapshotError::FingerprintMismatch {
            kind: R::KIND,
            expected,
            found: stored.fingerprint,
        });
    }

    let input = Resolvable::<R>::from_json(&stored.bits)?;
    Ok(BitField::new(input)?)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Export a bitfield to a file as canonical JSON.
///
/// Creates parent directories if needed. Byte-for-byte identical across
/// identical masks.
pub fn export_mask_to_file<R: FlagRegistry>(
    field: &BitField<R>,
    path: &Path,
) -> Result<(), SnapshotError> {
    let json = encode_mask(field)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, json.as_bytes())?;
    Ok(())
}

/// Import a bitfield from a JSON file, with full `restore_mask` validation.
pub fn import_mask_from_file<R: FlagRegistry>(path: &Path) -> Result<BitField<R>, SnapshotError> {
    let content = fs::read_to_string(path)?;
    restore_mask(&content)
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// SHA-256 of the encoded mask. Lowercase hex string.
///
/// Covers kind, fingerprint and bits, so two stored masks hash equal only
/// when they would restore to the same value under the same registry.
pub fn mask_hash<R: FlagRegistry>(field: &BitField<R>) -> Result<String, SnapshotError> {
    Ok(hex_digest(encode_mask(field)?.as_bytes()))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intents::{GatewayIntents, IntentsBitField};
    use crate::permissions::{Permissions, PermissionsBitField};
    use sha2::{Digest, Sha256};

    fn make_test_mask() -> PermissionsBitField {
        PermissionsBitField::new(["ViewChannel", "SendMessages", "ModerateMembers"]).unwrap()
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir()
            .join("bitfield_snapshot_codec_tests")
            .join(name);
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("mask.json")
    }

    // ── Roundtrip encode → restore → encode ─────────────────────────

    #[test]
    fn roundtrip_produces_identical_json() {
        let field = make_test_mask();
        let json1 = encode_mask(&field).unwrap();
        let restored = restore_mask::<Permissions>(&json1).unwrap();
        let json2 = encode_mask(&restored).unwrap();
        assert_eq!(json1, json2, "Roundtrip must produce identical JSON");
        assert_eq!(restored, field);
    }

    #[test]
    fn encoding_layout_is_fixed() {
        let json = encode_mask(&IntentsBitField::new("Guilds").unwrap()).unwrap();
        assert!(json.starts_with(r#"{"kind":"intents","fingerprint":""#));
        assert!(json.ends_with(r#","bits":1}"#));
    }

    #[test]
    fn restored_masks_are_mutable() {
        let field = make_test_mask().frozen();
        let json = encode_mask(&field).unwrap();
        let restored = restore_mask::<Permissions>(&json).unwrap();
        assert!(!restored.is_frozen());
    }

    // ── Validation failures ─────────────────────────────────────────

    #[test]
    fn wrong_kind_returns_kind_mismatch() {
        let json = encode_mask(&IntentsBitField::new("Guilds").unwrap()).unwrap();
        match restore_mask::<Permissions>(&json).unwrap_err() {
            SnapshotError::KindMismatch { expected, found } => {
                assert_eq!(expected, "permissions");
                assert_eq!(found, "intents");
            }
            other => panic!("Expected KindMismatch, got: {:?}", other),
        }
    }

    #[test]
    fn stale_fingerprint_returns_fingerprint_mismatch() {
        let mut stored = capture(&make_test_mask());
        stored.fingerprint = "0".repeat(64);
        let json = serde_json::to_string(&stored).unwrap();
        match restore_mask::<Permissions>(&json).unwrap_err() {
            SnapshotError::FingerprintMismatch { kind, .. } => assert_eq!(kind, "permissions"),
            other => panic!("Expected FingerprintMismatch, got: {:?}", other),
        }
    }

    #[test]
    fn unresolvable_bits_return_invalid_resolvable() {
        let mut stored = capture(&make_test_mask());
        // Wide kinds store strings; a bare number is a kind mismatch.
        stored.bits = serde_json::json!(3072);
        let json = serde_json::to_string(&stored).unwrap();
        assert!(matches!(
            restore_mask::<Permissions>(&json),
            Err(SnapshotError::InvalidResolvable(_))
        ));
    }

    #[test]
    fn named_bits_restore() {
        let mut stored = capture(&PermissionsBitField::empty());
        stored.bits = serde_json::json!(["ViewChannel", "1024"]);
        let json = serde_json::to_string(&stored).unwrap();
        let field = restore_mask::<Permissions>(&json).unwrap();
        assert_eq!(field.to_array(), vec!["ViewChannel"]);
    }

    #[test]
    fn malformed_registry_returns_registry_violation() {
        struct Broken;
        impl FlagRegistry for Broken {
            type Bits = u8;
            const KIND: &'static str = "broken";
            const FLAGS: &'static [(&'static str, u8)] = &[("A", 1), ("B", 1)];
        }
        let json = encode_mask(&BitField::<Broken>::from_bits(1)).unwrap();
        assert!(matches!(
            restore_mask::<Broken>(&json),
            Err(SnapshotError::RegistryViolation(RegistryViolation::OverlappingBits { .. }))
        ));
    }

    #[test]
    fn unknown_field_returns_deserialization_error() {
        let json = r#"{"kind":"intents","fingerprint":"x","bits":1,"extra":true}"#;
        assert!(matches!(
            decode_mask(json),
            Err(SnapshotError::DeserializationError(_))
        ));
    }

    #[test]
    fn missing_field_returns_deserialization_error() {
        let json = r#"{"kind":"intents"}"#;
        assert!(matches!(
            decode_mask(json),
            Err(SnapshotError::DeserializationError(_))
        ));
    }

    // ── File I/O ────────────────────────────────────────────────────

    #[test]
    fn file_roundtrip_matches() {
        let field = make_test_mask();
        let path = temp_path("file_roundtrip");
        export_mask_to_file(&field, &path).unwrap();
        let imported = import_mask_from_file::<Permissions>(&path).unwrap();
        assert_eq!(imported, field);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            encode_mask(&field).unwrap()
        );
    }

    #[test]
    fn corrupted_file_returns_deserialization_error() {
        let path = temp_path("corrupted");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{ not valid json !!!}").unwrap();
        assert!(matches!(
            import_mask_from_file::<GatewayIntents>(&path),
            Err(SnapshotError::DeserializationError(_))
        ));
    }

    #[test]
    fn missing_file_returns_io_error() {
        let path = temp_path("missing");
        assert!(matches!(
            import_mask_from_file::<GatewayIntents>(&path),
            Err(SnapshotError::IoError(_))
        ));
    }

    // ── Hash ────────────────────────────────────────────────────────

    #[test]
    fn hash_is_deterministic() {
        let field = make_test_mask();
        let h1 = mask_hash(&field).unwrap();
        let h2 = mask_hash(&field).unwrap();
        assert_eq!(h1, h2, "Same mask must produce same hash");
        assert_eq!(h1.len(), 64, "SHA-256 hex string must be 64 chars");
    }

    #[test]
    fn hash_matches_file_hash() {
        let field = make_test_mask();
        let mem_hash = mask_hash(&field).unwrap();

        let path = temp_path("hash_parity");
        export_mask_to_file(&field, &path).unwrap();

        let file_bytes = std::fs::read(&path).unwrap();
        let file_hash: String = Sha256::digest(&file_bytes)
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        assert_eq!(mem_hash, file_hash);
    }
}
