#![forbid(unsafe_code)]

//! Bitfield Runtime — concrete flag kinds and persistence on top of
//! `bitfield_core`.
//!
//! Provides the guild permission and gateway intent registries, drift
//! reporting between two masks, and a fingerprinted stored-mask codec.
//!
//! No resolution logic lives here. All of it is delegated to the core.

pub mod permissions;
pub mod intents;
pub mod drift;
pub mod snapshot_codec;
