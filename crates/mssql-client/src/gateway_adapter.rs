//! Bridges [`Client<Ready>`] into the narrow `Connection`/`SqlConnection`
//! boundary `mssql-pool`/`mssql-handle` pool against.
//!
//! The pool only ever asks a connection to health-check, reset, run a
//! query/statement, and commit or roll back; it knows nothing about TDS,
//! routing redirects, or the type-state transitions this client uses
//! internally. `GatewayConnection` is the one place those two worlds meet.
//!
//! Every method below forwards to the client's own (wire-protocol)
//! implementation, so this adapter compiles and type-checks today even
//! though the client beneath it still has to finish the TDS layer.

use async_trait::async_trait;
use mssql_driver_pool::{Connection, ConnectionFactory};
use mssql_handle::{QueryResult, SqlConnection};
use mssql_types::SqlValue;

use crate::client::Client;
use crate::config::Config;
use crate::error::Error;
use crate::state::Ready;

/// A [`Client<Ready>`], adapted to the pool's connection boundary.
///
/// The client's own transaction state-machine (`Ready` / `InTransaction`)
/// is collapsed here: every statement runs in its own implicit
/// transaction, committed or rolled back by `SqlConnection::commit`/
/// `rollback` exactly as `mssql_handle::Handle::exec` expects.
pub struct GatewayConnection(Client<Ready>);

impl GatewayConnection {
    /// Wrap an already-connected client.
    #[must_use]
    pub fn new(client: Client<Ready>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl Connection for GatewayConnection {
    type Error = Error;

    async fn health_check(&mut self, query: &str) -> Result<(), Self::Error> {
        self.0.simple_query(query).await
    }

    async fn reset(&mut self) -> Result<(), Self::Error> {
        self.0.simple_query("ROLLBACK").await
    }
}

#[async_trait]
impl SqlConnection for GatewayConnection {
    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryResult, Self::Error> {
        let bound: Vec<&SqlValue> = params.iter().collect();
        let to_sql: Vec<&(dyn crate::ToSql + Sync)> =
            bound.iter().map(|value| *value as &(dyn crate::ToSql + Sync)).collect();
        let rows = self.0.query(sql, &to_sql).await?;

        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|column| column.name.clone()).collect())
            .unwrap_or_default();
        let rows = rows
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|(column, value)| (column.name.clone(), value.clone()))
                    .collect()
            })
            .collect();

        Ok(QueryResult { columns, rows })
    }

    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, Self::Error> {
        let bound: Vec<&SqlValue> = params.iter().collect();
        let to_sql: Vec<&(dyn crate::ToSql + Sync)> =
            bound.iter().map(|value| *value as &(dyn crate::ToSql + Sync)).collect();
        self.0.execute(sql, &to_sql).await
    }

    async fn commit(&mut self) -> Result<(), Self::Error> {
        self.0.simple_query("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<(), Self::Error> {
        self.0.simple_query("ROLLBACK").await
    }
}

/// Connects to SQL Server and produces [`GatewayConnection`]s for the pool.
pub struct GatewayConnectionFactory {
    config: Config,
}

impl GatewayConnectionFactory {
    /// Build a factory that dials `config` for every new pooled connection.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConnectionFactory for GatewayConnectionFactory {
    type Connection = GatewayConnection;

    async fn connect(&self) -> Result<Self::Connection, Error> {
        let client = Client::connect(self.config.clone()).await?;
        Ok(GatewayConnection::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_connection_factory<F: ConnectionFactory>() {}
    fn assert_sql_connection<C: SqlConnection>() {}

    #[test]
    fn gateway_connection_satisfies_the_pool_boundary() {
        assert_connection_factory::<GatewayConnectionFactory>();
        assert_sql_connection::<GatewayConnection>();
    }
}
