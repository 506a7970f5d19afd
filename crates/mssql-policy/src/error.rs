//! Policy violation types.

use thiserror::Error;

/// Why a statement or identifier was rejected.
///
/// Carried as a machine-readable variant (rather than a bare string) so
/// callers such as the request pipeline can attach the right audit payload
/// without re-parsing error text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    /// The input was empty or whitespace-only.
    #[error("SQL statement is empty")]
    EmptyInput,

    /// A blocked keyword (`DROP`, `TRUNCATE`, ...) appeared as a whole word.
    #[error("Blocked keyword detected: {0}")]
    BlockedKeyword(String),

    /// A token began with a blocked prefix (`xp_`, `sp_`).
    #[error("Blocked prefix detected: {0}")]
    BlockedPrefix(String),

    /// The statement's first token is not permitted in the current mode.
    #[error("Disallowed statement type: {0}")]
    DisallowedStatementType(String),

    /// An identifier failed the `[A-Za-z_][A-Za-z0-9_]*` grammar or matched
    /// a blocked keyword.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}
