//! Gateway-level error composition.

use mssql_handle::HandleError;
use mssql_policy::PolicyViolation;
use mssql_registry::RegistryError;
use thiserror::Error;

/// Every error a pipeline operation can produce.
#[derive(Debug, Error)]
pub enum GatewayError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// The input failed SQL policy validation.
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    /// The target database alias is unknown, or its pool failed to build.
    #[error(transparent)]
    Registry(#[from] RegistryError<E>),

    /// The underlying handle/connection reported a failure.
    #[error(transparent)]
    Handle(#[from] HandleError<E>),

    /// A query-file name failed the `^[A-Za-z0-9_-]+\.sql$` grammar.
    #[error("Invalid filename")]
    InvalidFilename,

    /// A resolved query-file path escaped the configured query directory.
    #[error("Invalid filename")]
    PathTraversal,

    /// Reading a query file failed.
    #[error("failed to read query file: {0}")]
    Io(#[from] std::io::Error),

    /// A view/function/procedure definition lookup returned no object.
    #[error("{kind} not found: {qualified}")]
    ObjectNotFound {
        /// `"View"`, `"Function"`, etc.
        kind: &'static str,
        /// The `schema.name` that was looked up.
        qualified: String,
    },
}
