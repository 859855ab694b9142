//! Membership rules for `has` and everything built on it.

use crate::registry::FlagRegistry;

/// Decides whether `bitfield` contains every bit of `requested`.
///
/// The default is the plain bitwise check. Flag kinds with contextual
/// rules (an administrator bit that implies every other permission, say)
/// implement this to layer them on top.
pub trait HasRule<R: FlagRegistry> {
    fn has(&self, bitfield: R::Bits, requested: R::Bits) -> bool {
        plain_has::<R>(bitfield, requested)
    }
}

/// The bitwise rule: `bitfield & requested == requested`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plain;

impl<R: FlagRegistry> HasRule<R> for Plain {}

pub fn plain_has<R: FlagRegistry>(bitfield: R::Bits, requested: R::Bits) -> bool {
    (bitfield & requested) == requested
}
