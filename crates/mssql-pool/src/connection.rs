//! The narrow interface a driver connection must satisfy to be pooled.

use async_trait::async_trait;

/// The minimum a pooled connection must support: a liveness probe and a
/// way to reset any transaction state before being handed to the next
/// caller.
///
/// This is deliberately narrow — it says nothing about running queries —
/// so that this crate has no dependency on a concrete driver or on
/// `mssql-types`. [`mssql-handle`](../mssql_handle/index.html) layers the
/// query/exec surface on top via its own `SqlConnection: Connection` trait.
#[async_trait]
pub trait Connection: Send + 'static {
    /// The error type returned by this connection's operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run the pool's health-check query (`SELECT 1` by default) against
    /// this connection. An `Err` marks the connection unhealthy.
    async fn health_check(&mut self, query: &str) -> Result<(), Self::Error>;

    /// Roll back any open transaction, resetting session state before the
    /// connection is re-parked. Safe to call when there is no open
    /// transaction.
    async fn reset(&mut self) -> Result<(), Self::Error>;
}

/// Produces new [`Connection`]s on demand.
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    /// The connection type this factory produces.
    type Connection: Connection;

    /// Establish a new connection.
    async fn connect(
        &self,
    ) -> Result<Self::Connection, <Self::Connection as Connection>::Error>;
}
