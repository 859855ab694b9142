/// Golden fingerprint test — the canonical registry encoding is a storage
/// contract. Masks persisted under a fingerprint are only trusted while the
/// encoding stays byte-identical.
///
/// This test must NEVER be modified to match new behavior.
/// If it fails, stored masks have silently changed meaning.

use std::fs;

use bitfield_core::hashing::{canonical_registry, registry_fingerprint};
use bitfield_core::FlagRegistry;

struct Access;

impl FlagRegistry for Access {
    type Bits = u32;
    const KIND: &'static str = "access";
    const FLAGS: &'static [(&'static str, u32)] = &[("Read", 1), ("Write", 2), ("Admin", 4)];
}

/// Same flags, declared in a different order.
struct Reordered;

impl FlagRegistry for Reordered {
    type Bits = u32;
    const KIND: &'static str = "access";
    const FLAGS: &'static [(&'static str, u32)] = &[("Write", 2), ("Read", 1), ("Admin", 4)];
}

fn load_expected(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e))
        .trim()
        .to_string()
}

#[test]
fn golden_fingerprint_matches() {
    let fingerprint = registry_fingerprint::<Access>();
    let expected = load_expected("tests/golden/access_fingerprint.txt");
    assert_eq!(
        fingerprint, expected,
        "GOLDEN TEST FAILED: canonical registry encoding changed.\n\
         Got:      {}\n\
         Expected: {}\n\
         Encoding: {}",
        fingerprint,
        expected,
        String::from_utf8_lossy(&canonical_registry::<Access>())
    );
}

#[test]
fn fingerprint_is_deterministic() {
    assert_eq!(registry_fingerprint::<Access>(), registry_fingerprint::<Access>());
}

#[test]
fn declaration_order_is_part_of_the_fingerprint() {
    assert_ne!(
        registry_fingerprint::<Access>(),
        registry_fingerprint::<Reordered>(),
        "reordering flags must change the fingerprint"
    );
}
