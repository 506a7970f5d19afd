//! Handle error types.

use mssql_driver_pool::PoolError;
use thiserror::Error;

/// Errors produced by [`crate::handle::Handle`].
#[derive(Debug, Error)]
pub enum HandleError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// The handle has already been closed.
    #[error("handle is closed")]
    Closed,

    /// Failed to acquire a connection from the pool.
    #[error(transparent)]
    Pool(#[from] PoolError<E>),

    /// The underlying connection reported a driver error.
    #[error(transparent)]
    Driver(#[source] E),
}
