//! Flag registries — the ordered name → bit tables a bitfield is built against.
//!
//! A registry is pure data supplied by the code that owns a flag kind
//! (permissions, gateway intents, ...). Declaration order is significant:
//! every derived form (`to_array`, `serialize_flags`, canonical hashes)
//! walks `FLAGS` front to back.

use crate::bits::Bits;

/// Ordered, statically known table of named flags.
///
/// ```
/// use bitfield_core::registry::FlagRegistry;
///
/// struct Access;
///
/// impl FlagRegistry for Access {
///     type Bits = u32;
///     const KIND: &'static str = "access";
///     const FLAGS: &'static [(&'static str, u32)] =
///         &[("Read", 1), ("Write", 2), ("Admin", 4)];
/// }
///
/// assert_eq!(Access::lookup("Write"), Some(2));
/// assert_eq!(Access::all(), 7);
/// ```
pub trait FlagRegistry: Sized + 'static {
    type Bits: Bits;

    /// Short kind name used in errors, logs and stored masks.
    const KIND: &'static str;

    /// `(name, bit)` pairs in declaration order.
    const FLAGS: &'static [(&'static str, Self::Bits)];

    /// The empty value.
    const DEFAULT: Self::Bits = <Self::Bits as Bits>::ZERO;

    /// Exact-name lookup.
    fn lookup(name: &str) -> Option<Self::Bits> {
        Self::FLAGS
            .iter()
            .find(|(flag, _)| *flag == name)
            .map(|(_, bit)| *bit)
    }

    /// Union of every registered bit.
    fn all() -> Self::Bits {
        Self::FLAGS
            .iter()
            .fold(Self::DEFAULT, |acc, (_, bit)| acc | *bit)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{Access, WideAccess};
    use super::*;

    #[test]
    fn lookup_is_exact() {
        assert_eq!(Access::lookup("Read"), Some(1));
        assert_eq!(Access::lookup("read"), None);
        assert_eq!(Access::lookup(""), None);
    }

    #[test]
    fn all_unions_every_flag() {
        assert_eq!(Access::all(), 7);
        assert_eq!(WideAccess::all(), 7 | (1 << 40));
    }

    #[test]
    fn default_is_zero_unless_overridden() {
        assert_eq!(Access::DEFAULT, 0);
        assert_eq!(WideAccess::DEFAULT, 0);
    }
}
