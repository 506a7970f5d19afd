//! The data-carrying half of a pooled connection.

use std::collections::HashMap;

use async_trait::async_trait;
use mssql_driver_pool::Connection;
use mssql_types::SqlValue;

/// The result of a `SELECT`: column names, in driver order, plus every row
/// projected as `{column_name -> value}`.
///
/// An empty column description yields an empty row list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column names, in driver-reported order.
    pub columns: Vec<String>,
    /// Rows, each a map from column name to value.
    pub rows: Vec<HashMap<String, SqlValue>>,
}

/// Extends [`mssql_driver_pool::Connection`] with the query/exec/transaction
/// surface the gateway's handle layer needs.
///
/// `mssql-client::Client<Ready>` is the production implementor (via its
/// `gateway_adapter` module); `mssql-testing::MockConnection` is the
/// implementor used throughout this workspace's unit tests.
#[async_trait]
pub trait SqlConnection: Connection {
    /// Execute a read query, returning every row materialised.
    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryResult, Self::Error>;

    /// Execute a statement (INSERT/UPDATE/DELETE, or `EXEC`), returning the
    /// number of affected rows.
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, Self::Error>;

    /// Commit the current transaction.
    async fn commit(&mut self) -> Result<(), Self::Error>;

    /// Roll back the current transaction.
    async fn rollback(&mut self) -> Result<(), Self::Error>;
}
