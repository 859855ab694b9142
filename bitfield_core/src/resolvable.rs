//! Resolvable inputs — every shape accepted wherever a flag set is expected.
//!
//! Resolvables are pure data. They carry the caller's input only; turning
//! them into bits is the resolver's job (`resolve.rs`).

use std::fmt;

use serde_json::Value;

use crate::bitfield::BitField;
use crate::bits::Bits;
use crate::error::BitFieldError;
use crate::registry::FlagRegistry;

/// A flag set in any of its accepted representations.
pub enum Resolvable<R: FlagRegistry> {
    /// Nothing supplied; resolves to the registry default.
    Absent,
    /// A raw packed integer of the registry's kind.
    Bits(R::Bits),
    /// A flag name or a decimal literal.
    Text(String),
    /// An existing bitfield of the same registry.
    Field(BitField<R>),
    /// Any mix of the above, OR-ed together.
    List(Vec<Resolvable<R>>),
}

impl<R: FlagRegistry> Resolvable<R> {
    /// Build a resolvable from JSON input.
    ///
    /// Arrays recurse, `null` is absent, strings become text. Numbers are
    /// only accepted for JSON-safe kinds: a wide kind's wire form is a
    /// decimal string, so a bare number is a kind mismatch.
    pub fn from_json(value: &Value) -> Result<Self, BitFieldError> {
        match value {
            Value::Null => Ok(Resolvable::Absent),
            Value::String(text) => Ok(Resolvable::Text(text.clone())),
            Value::Array(items) => items
                .iter()
                .map(Resolvable::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Resolvable::List),
            Value::Number(n) if R::Bits::JSON_SAFE => n
                .as_u64()
                .and_then(R::Bits::from_u64)
                .map(Resolvable::Bits)
                .ok_or_else(|| BitFieldError::invalid(R::KIND, n.to_string())),
            other => Err(BitFieldError::invalid(R::KIND, other.to_string())),
        }
    }
}

impl<R: FlagRegistry> Clone for Resolvable<R> {
    fn clone(&self) -> Self {
        match self {
            Resolvable::Absent => Resolvable::Absent,
            Resolvable::Bits(bits) => Resolvable::Bits(*bits),
            Resolvable::Text(text) => Resolvable::Text(text.clone()),
            Resolvable::Field(field) => Resolvable::Field(field.clone()),
            Resolvable::List(items) => Resolvable::List(items.clone()),
        }
    }
}

impl<R: FlagRegistry> fmt::Display for Resolvable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolvable::Absent => write!(f, "<absent>"),
            Resolvable::Bits(bits) => write!(f, "{}", bits),
            Resolvable::Text(text) => write!(f, "{:?}", text),
            Resolvable::Field(field) => write!(f, "BitField({})", field.value()),
            Resolvable::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl<R: FlagRegistry> fmt::Debug for Resolvable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resolvable<{}>({})", R::KIND, self)
    }
}

// ── Conversions ────────────────────────────────────────────────────

macro_rules! impl_from_bits {
    ($($t:ty),*) => {$(
        impl<R: FlagRegistry<Bits = $t>> From<$t> for Resolvable<R> {
            fn from(bits: $t) -> Self {
                Resolvable::Bits(bits)
            }
        }
    )*};
}

impl_from_bits!(u8, u16, u32, u64, u128);

impl<R: FlagRegistry> From<()> for Resolvable<R> {
    fn from(_: ()) -> Self {
        Resolvable::Absent
    }
}

impl<R: FlagRegistry> From<&str> for Resolvable<R> {
    fn from(text: &str) -> Self {
        Resolvable::Text(text.to_string())
    }
}

impl<R: FlagRegistry> From<String> for Resolvable<R> {
    fn from(text: String) -> Self {
        Resolvable::Text(text)
    }
}

impl<R: FlagRegistry> From<BitField<R>> for Resolvable<R> {
    fn from(field: BitField<R>) -> Self {
        Resolvable::Field(field)
    }
}

impl<R: FlagRegistry> From<&BitField<R>> for Resolvable<R> {
    fn from(field: &BitField<R>) -> Self {
        Resolvable::Field(field.clone())
    }
}

impl<R: FlagRegistry, T: Into<Resolvable<R>>> From<Option<T>> for Resolvable<R> {
    fn from(input: Option<T>) -> Self {
        input.map_or(Resolvable::Absent, Into::into)
    }
}

impl<R: FlagRegistry, T: Into<Resolvable<R>>> From<Vec<T>> for Resolvable<R> {
    fn from(items: Vec<T>) -> Self {
        Resolvable::List(items.into_iter().map(Into::into).collect())
    }
}

impl<R: FlagRegistry, T: Into<Resolvable<R>>, const N: usize> From<[T; N]> for Resolvable<R> {
    fn from(items: [T; N]) -> Self {
        Resolvable::List(items.into_iter().map(Into::into).collect())
    }
}

impl<R: FlagRegistry, T: Clone + Into<Resolvable<R>>> From<&[T]> for Resolvable<R> {
    fn from(items: &[T]) -> Self {
        Resolvable::List(items.iter().cloned().map(Into::into).collect())
    }
}
