//! Registry error types.

use mssql_driver_pool::PoolError;
use thiserror::Error;

/// Errors produced by [`crate::Registry`].
#[derive(Debug, Error)]
pub enum RegistryError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// `get`/`close_one` referenced an alias not present in configuration.
    #[error("unknown database alias '{alias}'; available: {available:?}")]
    UnknownAlias {
        /// The alias that was looked up.
        alias: String,
        /// Every alias actually configured.
        available: Vec<String>,
    },

    /// Failed to establish the pool backing a newly constructed handle.
    #[error(transparent)]
    Pool(#[from] PoolError<E>),
}
