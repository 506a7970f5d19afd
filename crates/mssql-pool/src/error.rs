//! Pool error types.

use thiserror::Error;

/// Errors produced by [`crate::pool::Pool`].
///
/// Generic over `E`, the underlying connection factory's error type, so
/// this crate never depends on a concrete driver.
#[derive(Debug, Error)]
pub enum PoolError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// The pool has been closed; no further connections will be handed out.
    #[error("pool is closed")]
    PoolClosed,

    /// `acquire_timeout` elapsed before a connection became available.
    #[error("timed out waiting for a connection after {waited_ms}ms")]
    AcquireTimeout {
        /// How long the caller actually waited, in milliseconds.
        waited_ms: u64,
    },

    /// The connection factory failed to establish a new connection.
    #[error("failed to create connection: {0}")]
    ConnectionFailed(#[source] E),

    /// The supplied [`PoolConfig`](crate::config::PoolConfig) failed validation.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),
}
