//! Type conversion error types.

use thiserror::Error;

/// Errors that occur converting between [`SqlValue`](crate::SqlValue) and Rust types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The value could not be converted to the requested Rust type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The Rust type (or shape) that was expected.
        expected: &'static str,
        /// A description of what was actually found.
        actual: String,
    },

    /// A `NULL` value was encountered where a non-nullable target was requested.
    #[error("unexpected NULL value")]
    UnexpectedNull,
}
