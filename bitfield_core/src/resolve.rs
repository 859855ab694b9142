//! Resolver — canonicalizes any resolvable into a registry's packed integer.
//!
//! All ambiguity of the accepted input shapes lives here; every other
//! operation works on canonical bits.
//!
//! Rules, in order:
//!   - absent                        → registry default
//!   - integer >= default            → unchanged
//!   - bitfield                      → its packed bits
//!   - sequence                      → OR of each element, from the default
//!   - all-digit string              → parsed into the registry kind
//!   - any other string              → exact flag-name lookup
//!   - anything else                 → InvalidResolvable

use crate::bits::{is_decimal_literal, Bits};
use crate::error::BitFieldError;
use crate::registry::FlagRegistry;
use crate::resolvable::Resolvable;

/// Resolve `input` against registry `R`.
pub fn resolve<R: FlagRegistry>(input: &Resolvable<R>) -> Result<R::Bits, BitFieldError> {
    match input {
        Resolvable::Absent => Ok(R::DEFAULT),
        Resolvable::Bits(bits) if *bits >= R::DEFAULT => Ok(*bits),
        Resolvable::Field(field) => Ok(field.value()),
        Resolvable::List(items) => items
            .iter()
            .try_fold(R::DEFAULT, |acc, item| -> Result<R::Bits, BitFieldError> {
                Ok(acc | resolve(item)?)
            }),
        Resolvable::Text(text) if is_decimal_literal(text) => {
            R::Bits::parse_decimal(text).ok_or_else(|| rejected(input))
        }
        Resolvable::Text(text) => R::lookup(text).ok_or_else(|| rejected(input)),
        Resolvable::Bits(_) => Err(rejected(input)),
    }
}

/// Resolve and OR a batch of inputs. Either every input resolves or none
/// of them contribute.
pub fn resolve_all<R, I, T>(inputs: I) -> Result<R::Bits, BitFieldError>
where
    R: FlagRegistry,
    I: IntoIterator<Item = T>,
    T: Into<Resolvable<R>>,
{
    inputs
        .into_iter()
        .try_fold(R::DEFAULT, |acc, input| -> Result<R::Bits, BitFieldError> {
            Ok(acc | resolve(&input.into())?)
        })
}

fn rejected<R: FlagRegistry>(input: &Resolvable<R>) -> BitFieldError {
    let rendered = input.to_string();
    tracing::debug!(kind = R::KIND, input = %rendered, "rejected bitfield resolvable");
    BitFieldError::invalid(R::KIND, rendered)
}
