use thiserror::Error;

/// Failure to canonicalize an input into a registry's packed integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitFieldError {
    /// The input is not a known flag name, in-range integer, decimal string,
    /// bitfield, or sequence of those.
    #[error("invalid {kind} bitfield resolvable: {input}")]
    InvalidResolvable {
        /// Registry kind the input was resolved against.
        kind: &'static str,
        /// Rendering of the rejected input.
        input: String,
    },
}

impl BitFieldError {
    pub fn invalid(kind: &'static str, input: impl Into<String>) -> Self {
        BitFieldError::InvalidResolvable {
            kind,
            input: input.into(),
        }
    }
}
