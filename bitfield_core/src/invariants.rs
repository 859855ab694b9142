//! Registry checks.
//!
//! Bitfields never validate their registry on the hot path; these checks are
//! for registry authors (in tests) and for loaders that want a hard guarantee
//! before trusting stored masks.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::bits::{is_decimal_literal, Bits};
use crate::registry::FlagRegistry;

/// First registry rule a flag table breaks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryViolation {
    #[error("[{kind}] flag at position {position} has an empty name")]
    EmptyName { kind: &'static str, position: usize },

    /// Numeric names would be shadowed by the decimal-string resolution path.
    #[error("[{kind}] flag name {name:?} is numeric")]
    NumericName { kind: &'static str, name: &'static str },

    #[error("[{kind}] flag name {name:?} is declared twice")]
    DuplicateName { kind: &'static str, name: &'static str },

    #[error("[{kind}] flag {name:?} has value {value}, expected exactly one set bit")]
    NotSingleBit {
        kind: &'static str,
        name: &'static str,
        value: String,
    },

    #[error("[{kind}] flags {first:?} and {second:?} share a bit")]
    OverlappingBits {
        kind: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error("[{kind}] flag {name:?} overlaps the default value")]
    DefaultOverlap { kind: &'static str, name: &'static str },
}

/// Run every registry check. Panics on the first failure.
pub fn validate_registry<R: FlagRegistry>() {
    if let Err(violation) = try_validate_registry::<R>() {
        panic!("Registry violation: {}", violation);
    }
}

/// Non-panicking variant of `validate_registry`.
pub fn try_validate_registry<R: FlagRegistry>() -> Result<(), RegistryViolation> {
    let kind = R::KIND;
    let mut names = BTreeSet::new();
    let mut seen = R::Bits::ZERO;

    for (position, &(name, bit)) in R::FLAGS.iter().enumerate() {
        if name.is_empty() {
            return Err(RegistryViolation::EmptyName { kind, position });
        }
        if is_decimal_literal(name) {
            return Err(RegistryViolation::NumericName { kind, name });
        }
        if !names.insert(name) {
            return Err(RegistryViolation::DuplicateName { kind, name });
        }
        if bit.bit_count() != 1 {
            return Err(RegistryViolation::NotSingleBit {
                kind,
                name,
                value: bit.to_string(),
            });
        }
        if (seen & bit) != R::Bits::ZERO {
            let first = R::FLAGS[..position]
                .iter()
                .find(|(_, earlier)| (*earlier & bit) != R::Bits::ZERO)
                .map(|(earlier, _)| *earlier)
                .unwrap_or(name);
            return Err(RegistryViolation::OverlappingBits {
                kind,
                first,
                second: name,
            });
        }
        if (R::DEFAULT & bit) != R::Bits::ZERO {
            return Err(RegistryViolation::DefaultOverlap { kind, name });
        }
        seen = seen | bit;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::fixtures::{Access, WideAccess};

    macro_rules! registry {
        ($ty:ident, $bits:ty, [$(($name:expr, $bit:expr)),* $(,)?]) => {
            struct $ty;
            impl FlagRegistry for $ty {
                type Bits = $bits;
                const KIND: &'static str = "test";
                const FLAGS: &'static [(&'static str, $bits)] = &[$(($name, $bit)),*];
            }
        };
    }

    #[test]
    fn fixtures_are_valid() {
        validate_registry::<Access>();
        validate_registry::<WideAccess>();
    }

    #[test]
    fn rejects_empty_name() {
        registry!(Empty, u8, [("A", 1), ("", 2)]);
        assert_eq!(
            try_validate_registry::<Empty>(),
            Err(RegistryViolation::EmptyName { kind: "test", position: 1 })
        );
    }

    #[test]
    fn rejects_numeric_name() {
        registry!(Numeric, u8, [("8", 8)]);
        assert!(matches!(
            try_validate_registry::<Numeric>(),
            Err(RegistryViolation::NumericName { name: "8", .. })
        ));
    }

    #[test]
    fn rejects_duplicate_name() {
        registry!(Dup, u8, [("A", 1), ("A", 2)]);
        assert!(matches!(
            try_validate_registry::<Dup>(),
            Err(RegistryViolation::DuplicateName { name: "A", .. })
        ));
    }

    #[test]
    fn rejects_composite_and_zero_bits() {
        registry!(Composite, u16, [("AB", 3)]);
        registry!(Zero, u16, [("None", 0)]);
        assert!(matches!(
            try_validate_registry::<Composite>(),
            Err(RegistryViolation::NotSingleBit { name: "AB", .. })
        ));
        assert!(matches!(
            try_validate_registry::<Zero>(),
            Err(RegistryViolation::NotSingleBit { name: "None", .. })
        ));
    }

    #[test]
    fn rejects_overlap_and_names_both_flags() {
        registry!(Overlap, u32, [("A", 1), ("B", 2), ("C", 2)]);
        assert_eq!(
            try_validate_registry::<Overlap>(),
            Err(RegistryViolation::OverlappingBits {
                kind: "test",
                first: "B",
                second: "C",
            })
        );
    }

    #[test]
    fn rejects_default_overlap() {
        struct Seeded;
        impl FlagRegistry for Seeded {
            type Bits = u8;
            const KIND: &'static str = "seeded";
            const FLAGS: &'static [(&'static str, u8)] = &[("A", 1), ("B", 2)];
            const DEFAULT: u8 = 2;
        }
        assert!(matches!(
            try_validate_registry::<Seeded>(),
            Err(RegistryViolation::DefaultOverlap { name: "B", .. })
        ));
    }

    #[test]
    #[should_panic(expected = "Registry violation")]
    fn validate_panics() {
        registry!(Bad, u8, [("A", 1), ("A", 1)]);
        validate_registry::<Bad>();
    }
}
