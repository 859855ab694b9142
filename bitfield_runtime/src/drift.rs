//! Drift detection — flag-level comparison of two masks of one kind.
//!
//! Feeds presentation layers such as permission-diff reporting.
//! Names are always listed in registry declaration order.

use std::fmt;

use bitfield_core::{BitField, FlagRegistry};
use serde::Serialize;
use serde_json::Value;

/// Structured comparison of a `before` and `after` mask.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagDrift {
    pub kind: &'static str,
    pub before: Value,
    pub after: Value,
    /// Set in `after` only.
    pub added: Vec<&'static str>,
    /// Set in `before` only.
    pub removed: Vec<&'static str>,
    /// Set in both.
    pub retained: Vec<&'static str>,
    /// Unregistered bits differ between the two masks.
    pub unregistered_changed: bool,
}

impl FlagDrift {
    /// No named flag and no unregistered bit changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && !self.unregistered_changed
    }
}

/// `+Added -Removed`, or `=` when nothing changed.
impl fmt::Display for FlagDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        parts.extend(self.added.iter().map(|name| format!("+{}", name)));
        parts.extend(self.removed.iter().map(|name| format!("-{}", name)));
        if self.unregistered_changed {
            parts.push("~unregistered".to_string());
        }
        if parts.is_empty() {
            write!(f, "=")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

/// Compare two masks of the same kind.
pub fn compare_fields<R: FlagRegistry>(before: &BitField<R>, after: &BitField<R>) -> FlagDrift {
    let a = before.value();
    let b = after.value();

    FlagDrift {
        kind: R::KIND,
        before: before.to_json(),
        after: after.to_json(),
        added: BitField::<R>::from_bits(b & !a).to_array(),
        removed: BitField::<R>::from_bits(a & !b).to_array(),
        retained: BitField::<R>::from_bits(a & b).to_array(),
        unregistered_changed: before.unregistered() != after.unregistered(),
    }
}
