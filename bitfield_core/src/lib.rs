#![forbid(unsafe_code)]

//! Typed bit-flag containers.
//!
//! A [`BitField`] packs a registry's named flags into one integer. Inputs
//! arrive in any [`Resolvable`] shape (names, raw integers, decimal strings,
//! other bitfields, sequences of those) and are canonicalized by the
//! resolver before anything else happens.

pub mod bits;
pub mod error;
pub mod registry;
pub mod resolvable;
pub mod resolve;
pub mod rules;
pub mod bitfield;
pub mod invariants;
pub mod hashing;

pub use bitfield::{BitField, Edit, Iter, State};
pub use bits::Bits;
pub use error::BitFieldError;
pub use registry::FlagRegistry;
pub use resolvable::Resolvable;
pub use rules::{HasRule, Plain};
