//! Error types for unit-aware array arithmetic
//!
//! [`UnitError`] covers everything the unit layer can report: mismatched
//! operands in additive operators, incompatible explicit conversions, unit
//! strings that fail to parse, and failures of the underlying array
//! arithmetic ([`ArrayError`]). Every failure is deterministic given its
//! inputs and is returned to the caller; nothing is retried or swallowed.

use std::fmt;
use thiserror::Error;

/// Result alias for operations that may produce [`UnitError`].
pub type UnitResult<T> = Result<T, UnitError>;

/// Result alias for host array operations that may produce [`ArrayError`].
pub type ArrayResult<T> = Result<T, ArrayError>;

/// Additive operation named in a mismatch error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Addition,
    Subtraction,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Addition => write!(f, "addition"),
            Operation::Subtraction => write!(f, "subtraction"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// Operands of `+`/`-` carry units that cannot be converted into each other.
    #[error("Unit mismatch in {operation}.")]
    UnitMismatch { operation: Operation },

    /// Source and target of a conversion describe different physical dimensions.
    #[error("'{from}' ({from_dimension}) and '{to}' ({to_dimension}) are not convertible")]
    IncompatibleUnits {
        from: String,
        from_dimension: String,
        to: String,
        to_dimension: String,
    },

    /// A unit string could not be parsed.
    #[error("malformed unit string '{input}': {reason}")]
    MalformedUnit { input: String, reason: String },

    /// A unit string names a symbol the registry does not know.
    #[error("'{symbol}' in unit string '{input}' is not a known unit")]
    UnknownUnit { input: String, symbol: String },

    /// Composing units left the representable range (an exponent outside
    /// `i8`, or a scale that is not a positive finite number).
    #[error("unit '{unit}' is out of range: {reason}")]
    OutOfRange { unit: String, reason: String },

    #[error(transparent)]
    Array(#[from] ArrayError),
}

/// Failures of the labeled array collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    #[error("array has {ndim} axes but {names} dimension names were given")]
    DimensionCountMismatch { ndim: usize, names: usize },

    #[error("dimension '{0}' is listed more than once")]
    DuplicateDimension(String),

    #[error("array has no dimension '{0}'")]
    UnknownDimension(String),

    #[error("conflicting sizes for dimension '{dim}': {left} vs {right}")]
    SizeMismatch {
        dim: String,
        left: usize,
        right: usize,
    },

    #[error("dataset has no variable '{0}'")]
    MissingVariable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_messages_name_the_operation() {
        let add = UnitError::UnitMismatch {
            operation: Operation::Addition,
        };
        let sub = UnitError::UnitMismatch {
            operation: Operation::Subtraction,
        };
        assert_eq!(add.to_string(), "Unit mismatch in addition.");
        assert_eq!(sub.to_string(), "Unit mismatch in subtraction.");
    }

    #[test]
    fn test_array_errors_convert() {
        let err: UnitError = ArrayError::UnknownDimension("y".into()).into();
        assert_eq!(err.to_string(), "array has no dimension 'y'");
    }
}
