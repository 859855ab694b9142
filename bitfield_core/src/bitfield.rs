//! BitField — a packed flag set bound to one registry.
//!
//! Lifecycle:
//!   1. created `Mutable` by resolving any input (`new`)
//!   2. `add` / `remove` rewrite the receiver in place while `Mutable`
//!   3. `freeze` moves it to `Frozen`, which is terminal
//!   4. `add` / `remove` on a frozen value leave it untouched and hand back
//!      a fresh `Mutable` value carrying the combined bits
//!
//! Every flag-set argument is resolved completely before anything is
//! written, so a failed resolution never leaves a partial edit behind.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::slice;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::Value;

use crate::bits::Bits;
use crate::error::BitFieldError;
use crate::registry::FlagRegistry;
use crate::resolvable::Resolvable;
use crate::resolve::resolve;
use crate::rules::{HasRule, Plain};

/// Freeze state of a bitfield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum State {
    #[default]
    Mutable,
    /// Terminal. Combination operations fork instead of writing.
    Frozen,
}

/// Packed flag set over registry `R`.
pub struct BitField<R: FlagRegistry> {
    bits: R::Bits,
    state: State,
    registry: PhantomData<fn() -> R>,
}

impl<R: FlagRegistry> BitField<R> {
    /// Resolve `bits` into a new mutable value.
    pub fn new(bits: impl Into<Resolvable<R>>) -> Result<Self, BitFieldError> {
        Ok(Self::from_bits(resolve(&bits.into())?))
    }

    /// Wrap a raw packed integer without consulting the registry.
    /// Unregistered bits are kept but never named.
    pub fn from_bits(bits: R::Bits) -> Self {
        Self {
            bits,
            state: State::Mutable,
            registry: PhantomData,
        }
    }

    pub fn empty() -> Self {
        Self::from_bits(R::DEFAULT)
    }

    /// Every registered flag.
    pub fn all() -> Self {
        Self::from_bits(R::all())
    }

    /// Resolve `bits` against this bitfield's registry.
    pub fn resolve(bits: impl Into<Resolvable<R>>) -> Result<R::Bits, BitFieldError> {
        resolve(&bits.into())
    }

    /// The raw packed integer.
    pub fn value(&self) -> R::Bits {
        self.bits
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.state == State::Frozen
    }

    // ── Queries ────────────────────────────────────────────────────

    /// At least one requested bit is set.
    pub fn any(&self, bits: impl Into<Resolvable<R>>) -> Result<bool, BitFieldError> {
        Ok((self.bits & resolve(&bits.into())?) != R::DEFAULT)
    }

    /// Packed integers are identical.
    pub fn equals(&self, bits: impl Into<Resolvable<R>>) -> Result<bool, BitFieldError> {
        Ok(self.bits == resolve(&bits.into())?)
    }

    /// Every requested bit is set.
    pub fn has(&self, bits: impl Into<Resolvable<R>>) -> Result<bool, BitFieldError> {
        self.has_with(bits, &Plain)
    }

    /// Every requested bit is set, as judged by `rule`.
    pub fn has_with<C: HasRule<R>>(
        &self,
        bits: impl Into<Resolvable<R>>,
        rule: &C,
    ) -> Result<bool, BitFieldError> {
        Ok(rule.has(self.bits, resolve(&bits.into())?))
    }

    /// Names from the requested set that this value lacks.
    pub fn missing(
        &self,
        bits: impl Into<Resolvable<R>>,
    ) -> Result<Vec<&'static str>, BitFieldError> {
        self.missing_with(bits, &Plain)
    }

    /// `missing` with a custom membership rule.
    ///
    /// The request becomes a fresh value, this value's bits are removed
    /// from it, and what remains is listed under `rule`.
    pub fn missing_with<C: HasRule<R>>(
        &self,
        bits: impl Into<Resolvable<R>>,
        rule: &C,
    ) -> Result<Vec<&'static str>, BitFieldError> {
        let mut requested = Self::new(bits)?;
        requested.remove(self)?;
        Ok(requested.to_array_with(rule))
    }

    // ── Combination ────────────────────────────────────────────────

    /// Union `bits` in. Pass a sequence to add several inputs at once.
    pub fn add(&mut self, bits: impl Into<Resolvable<R>>) -> Result<Edit<'_, R>, BitFieldError> {
        let total = resolve(&bits.into())?;
        Ok(self.apply(self.bits | total))
    }

    /// Clear `bits`. Pass a sequence to remove several inputs at once.
    pub fn remove(
        &mut self,
        bits: impl Into<Resolvable<R>>,
    ) -> Result<Edit<'_, R>, BitFieldError> {
        let total = resolve(&bits.into())?;
        Ok(self.apply(self.bits & !total))
    }

    /// Make this value immutable. Idempotent.
    pub fn freeze(&mut self) -> &mut Self {
        self.state = State::Frozen;
        self
    }

    /// By-value `freeze`.
    pub fn frozen(mut self) -> Self {
        self.freeze();
        self
    }

    fn apply(&mut self, next: R::Bits) -> Edit<'_, R> {
        match self.state {
            State::Mutable => {
                self.bits = next;
                Edit::InPlace(self)
            }
            State::Frozen => {
                tracing::debug!(
                    kind = R::KIND,
                    bits = %self.bits,
                    next = %next,
                    "frozen bitfield forked"
                );
                Edit::Forked(Self::from_bits(next))
            }
        }
    }

    // ── Derived forms ──────────────────────────────────────────────

    /// Every registered name mapped to `has(name)`, in declaration order.
    pub fn serialize_flags(&self) -> IndexMap<&'static str, bool> {
        self.serialize_flags_with(&Plain)
    }

    pub fn serialize_flags_with<C: HasRule<R>>(&self, rule: &C) -> IndexMap<&'static str, bool> {
        R::FLAGS
            .iter()
            .map(|(name, bit)| (*name, rule.has(self.bits, *bit)))
            .collect()
    }

    /// Names currently set, in declaration order.
    pub fn to_array(&self) -> Vec<&'static str> {
        self.iter().collect()
    }

    pub fn to_array_with<C: HasRule<R>>(&self, rule: &C) -> Vec<&'static str> {
        self.iter_with(rule).collect()
    }

    /// Lazy walk over the names currently set.
    ///
    /// The iterator captures the bits at call time; later edits to this
    /// value are not observed.
    pub fn iter(&self) -> Iter<'static, R, Plain> {
        self.iter_with(&Plain)
    }

    pub fn iter_with<'r, C: HasRule<R>>(&self, rule: &'r C) -> Iter<'r, R, C> {
        Iter {
            bits: self.bits,
            flags: R::FLAGS.iter(),
            rule,
        }
    }

    /// Wire form: number for JSON-safe kinds, decimal string otherwise.
    pub fn to_json(&self) -> Value {
        self.bits.to_json()
    }

    /// Bits outside every registered flag.
    pub fn unregistered(&self) -> R::Bits {
        self.bits & !R::all()
    }
}

impl<R: FlagRegistry> Default for BitField<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R: FlagRegistry> Clone for BitField<R> {
    fn clone(&self) -> Self {
        Self {
            bits: self.bits,
            state: self.state,
            registry: PhantomData,
        }
    }
}

/// Equality is on packed bits only; freeze state does not participate.
impl<R: FlagRegistry> PartialEq for BitField<R> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<R: FlagRegistry> Eq for BitField<R> {}

impl<R: FlagRegistry> Hash for BitField<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

impl<R: FlagRegistry> fmt::Debug for BitField<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitField")
            .field("kind", &R::KIND)
            .field("bits", &self.bits)
            .field("flags", &self.to_array())
            .field("state", &self.state)
            .finish()
    }
}

/// `Read | Write`, with any unregistered remainder appended in hex.
impl<R: FlagRegistry> fmt::Display for BitField<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.iter().map(str::to_string).collect();
        let rest = self.unregistered();
        if rest != R::Bits::ZERO {
            parts.push(format!("{:#x}", rest));
        }
        if parts.is_empty() {
            write!(f, "{}", self.bits)
        } else {
            write!(f, "{}", parts.join(" | "))
        }
    }
}

impl<'a, R: FlagRegistry> IntoIterator for &'a BitField<R> {
    type Item = &'static str;
    type IntoIter = Iter<'static, R, Plain>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<R: FlagRegistry> Serialize for BitField<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de, R: FlagRegistry> Deserialize<'de> for BitField<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Resolvable::from_json(&value)
            .and_then(|input| BitField::new(input))
            .map_err(de::Error::custom)
    }
}

// ── Edit ───────────────────────────────────────────────────────────

/// Outcome of `add` / `remove`: the receiver itself, or a fork of a
/// frozen receiver.
pub enum Edit<'a, R: FlagRegistry> {
    InPlace(&'a mut BitField<R>),
    Forked(BitField<R>),
}

impl<'a, R: FlagRegistry> Edit<'a, R> {
    pub fn is_forked(&self) -> bool {
        matches!(self, Edit::Forked(_))
    }

    /// Detach the result, cloning when it is the receiver.
    pub fn into_owned(self) -> BitField<R> {
        match self {
            Edit::InPlace(field) => field.clone(),
            Edit::Forked(field) => field,
        }
    }
}

impl<'a, R: FlagRegistry> Deref for Edit<'a, R> {
    type Target = BitField<R>;

    fn deref(&self) -> &BitField<R> {
        match self {
            Edit::InPlace(field) => &**field,
            Edit::Forked(field) => field,
        }
    }
}

impl<'a, R: FlagRegistry> DerefMut for Edit<'a, R> {
    fn deref_mut(&mut self) -> &mut BitField<R> {
        match self {
            Edit::InPlace(field) => &mut **field,
            Edit::Forked(field) => field,
        }
    }
}

impl<'a, R: FlagRegistry> fmt::Debug for Edit<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::InPlace(field) => f.debug_tuple("InPlace").field(field).finish(),
            Edit::Forked(field) => f.debug_tuple("Forked").field(field).finish(),
        }
    }
}

// ── Iteration ──────────────────────────────────────────────────────

/// Names set in a captured packed integer, in declaration order.
pub struct Iter<'r, R: FlagRegistry, C> {
    bits: R::Bits,
    flags: slice::Iter<'static, (&'static str, R::Bits)>,
    rule: &'r C,
}

impl<'r, R: FlagRegistry, C: HasRule<R>> Iterator for Iter<'r, R, C> {
    type Item = &'static str;

    fn next(&mut self) -> Option<&'static str> {
        let (bits, rule) = (self.bits, self.rule);
        self.flags
            .find(|(_, bit)| rule.has(bits, *bit))
            .map(|(name, _)| *name)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.flags.len()))
    }
}

impl<'r, R: FlagRegistry, C: HasRule<R>> FusedIterator for Iter<'r, R, C> {}

impl<'r, R: FlagRegistry, C> Clone for Iter<'r, R, C> {
    fn clone(&self) -> Self {
        Self {
            bits: self.bits,
            flags: self.flags.clone(),
            rule: self.rule,
        }
    }
}
