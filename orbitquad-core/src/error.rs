use crate::ArithmeticMode;

/// Result type used throughout the core.
pub type QuadResult<T> = Result<T, QuadError>;

/// Errors raised while expanding, assembling or verifying a scheme.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuadError {
    /// Malformed descriptor, table shape or verifier input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The requested arithmetic mode disagrees with the values supplied.
    #[error("arithmetic mode mismatch: expected {expected}, found {found}")]
    ModeMismatch {
        expected: ArithmeticMode,
        found: ArithmeticMode,
    },

    /// The operation leaves the set of values the exact mode can represent.
    #[error("not representable in exact arithmetic: {0}")]
    NotRepresentable(String),

    #[error("division by zero")]
    DivisionByZero,

    /// Malformed scalar expression.
    #[error("parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },
}

impl QuadError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        QuadError::Configuration(message.into())
    }
}

/// Fail with `ModeMismatch` unless `found` is the mode the caller asked for.
pub fn ensure_mode(expected: ArithmeticMode, found: ArithmeticMode) -> QuadResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(QuadError::ModeMismatch { expected, found })
    }
}
