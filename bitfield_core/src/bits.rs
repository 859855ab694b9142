//! Numeric kinds for packed flag sets.
//!
//! Every registry picks exactly one unsigned width. Narrow widths (up to 32
//! bits) are JSON-safe and travel as JSON numbers; wide widths (64 and 128
//! bits) travel as decimal strings so no consumer loses precision.

use std::fmt;
use std::hash::Hash;
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;

use serde_json::Value;

/// Unsigned integer kind backing a flag registry.
pub trait Bits:
    Copy
    + Eq
    + Ord
    + Hash
    + Default
    + fmt::Debug
    + fmt::Display
    + fmt::LowerHex
    + FromStr
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
    + Send
    + Sync
    + 'static
{
    const ZERO: Self;
    /// Whether every value of this kind fits in a JSON number without loss.
    const JSON_SAFE: bool;

    fn from_u64(value: u64) -> Option<Self>;

    fn to_u64(self) -> Option<u64>;

    fn bit_count(self) -> u32;

    /// Parse a decimal literal. `None` for anything that is not all ASCII
    /// digits, or that overflows this kind.
    fn parse_decimal(text: &str) -> Option<Self> {
        if is_decimal_literal(text) {
            text.parse().ok()
        } else {
            None
        }
    }

    /// Wire form: number when JSON-safe, decimal string otherwise.
    fn to_json(self) -> Value {
        match self.to_u64() {
            Some(n) if Self::JSON_SAFE => Value::from(n),
            _ => Value::String(self.to_string()),
        }
    }
}

/// True when `text` is non-empty and made only of ASCII digits.
pub fn is_decimal_literal(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

macro_rules! impl_bits {
    ($($t:ty => $safe:expr),* $(,)?) => {$(
        impl Bits for $t {
            const ZERO: Self = 0;
            const JSON_SAFE: bool = $safe;

            fn from_u64(value: u64) -> Option<Self> {
                <$t>::try_from(value).ok()
            }

            fn to_u64(self) -> Option<u64> {
                u64::try_from(self).ok()
            }

            fn bit_count(self) -> u32 {
                self.count_ones()
            }
        }
    )*};
}

impl_bits!(u8 => true, u16 => true, u32 => true, u64 => false, u128 => false);
