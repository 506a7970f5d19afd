//! SQL Server client implementation.

use std::marker::PhantomData;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::state::{ConnectionState, Disconnected, InTransaction, Ready};

/// SQL Server client with type-state connection management.
///
/// The generic parameter `S` represents the current connection state,
/// ensuring at compile time that certain operations are only available
/// in appropriate states.
pub struct Client<S: ConnectionState> {
    config: Config,
    _state: PhantomData<S>,
    // Placeholder for actual connection state
    // Real implementation would include:
    // - TLS stream
    // - Packet codec
    // - Prepared statement cache
}

impl Client<Disconnected> {
    /// Connect to SQL Server.
    ///
    /// This establishes a connection, performs TLS negotiation (if required),
    /// and authenticates with the server.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let client = Client::connect(config).await?;
    /// ```
    pub async fn connect(config: Config) -> Result<Client<Ready>> {
        const MAX_REDIRECT_ATTEMPTS: u8 = 2;
        let mut attempts = 0;
        let mut current_config = config;

        loop {
            attempts += 1;
            if attempts > MAX_REDIRECT_ATTEMPTS {
                return Err(Error::TooManyRedirects {
                    max: MAX_REDIRECT_ATTEMPTS,
                });
            }

            match Self::try_connect(&current_config).await {
                Ok(client) => return Ok(client),
                Err(Error::Routing { host, port }) => {
                    tracing::info!(
                        host = %host,
                        port = port,
                        "following Azure SQL routing redirect"
                    );
                    current_config = current_config.with_host(&host).with_port(port);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_connect(config: &Config) -> Result<Client<Ready>> {
        tracing::info!(
            host = %config.host,
            port = config.port,
            database = ?config.database,
            "connecting to SQL Server"
        );

        // Placeholder: actual connection logic would go here
        // 1. TCP connect
        // 2. TLS handshake (TDS 8.0: before prelogin, TDS 7.x: after prelogin)
        // 3. PreLogin exchange
        // 4. Login7 authentication
        // 5. Process login response

        todo!("Client::try_connect() - connection logic not yet implemented")
    }
}

impl Client<Ready> {
    /// Execute a query and return the results.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let rows = client.query("SELECT * FROM users WHERE id = @p1", &[&1]).await?;
    /// ```
    pub async fn query<'a>(
        &mut self,
        sql: &str,
        params: &[&(dyn crate::ToSql + Sync)],
    ) -> Result<Vec<crate::Row>> {
        tracing::debug!(sql = sql, params_count = params.len(), "executing query");

        // Placeholder: actual query execution
        todo!("Client::query() - query execution not yet implemented")
    }

    /// Execute a query that doesn't return rows.
    ///
    /// Returns the number of affected rows.
    pub async fn execute(
        &mut self,
        sql: &str,
        params: &[&(dyn crate::ToSql + Sync)],
    ) -> Result<u64> {
        tracing::debug!(
            sql = sql,
            params_count = params.len(),
            "executing statement"
        );

        // Placeholder: actual execution
        todo!("Client::execute() - execution not yet implemented")
    }

    /// Begin a transaction.
    ///
    /// This transitions the client from `Ready` to `InTransaction` state.
    pub async fn begin_transaction(self) -> Result<Client<InTransaction>> {
        tracing::debug!("beginning transaction");

        // Execute BEGIN TRANSACTION
        // Placeholder: actual transaction begin

        Ok(Client {
            config: self.config,
            _state: PhantomData,
        })
    }

    /// Execute a simple query without parameters.
    ///
    /// This is useful for DDL statements and simple queries.
    pub async fn simple_query(&mut self, sql: &str) -> Result<()> {
        tracing::debug!(sql = sql, "executing simple query");

        // Placeholder: actual simple query execution
        todo!("Client::simple_query() - simple query not yet implemented")
    }

    /// Close the connection gracefully.
    pub async fn close(self) -> Result<()> {
        tracing::debug!("closing connection");
        Ok(())
    }

    /// Get the current database name.
    #[must_use]
    pub fn database(&self) -> Option<&str> {
        self.config.database.as_deref()
    }

    /// Get the server host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Get the server port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.config.port
    }
}

impl Client<InTransaction> {
    /// Execute a query within the transaction.
    pub async fn query(
        &mut self,
        sql: &str,
        _params: &[&(dyn crate::ToSql + Sync)],
    ) -> Result<Vec<crate::Row>> {
        tracing::debug!(sql = sql, "executing query in transaction");
        todo!("Client<InTransaction>::query() not yet implemented")
    }

    /// Execute a statement within the transaction.
    pub async fn execute(
        &mut self,
        sql: &str,
        _params: &[&(dyn crate::ToSql + Sync)],
    ) -> Result<u64> {
        tracing::debug!(sql = sql, "executing statement in transaction");
        todo!("Client<InTransaction>::execute() not yet implemented")
    }

    /// Commit the transaction.
    ///
    /// This transitions the client back to `Ready` state.
    pub async fn commit(self) -> Result<Client<Ready>> {
        tracing::debug!("committing transaction");

        // Execute COMMIT TRANSACTION

        Ok(Client {
            config: self.config,
            _state: PhantomData,
        })
    }

    /// Rollback the transaction.
    ///
    /// This transitions the client back to `Ready` state.
    pub async fn rollback(self) -> Result<Client<Ready>> {
        tracing::debug!("rolling back transaction");

        // Execute ROLLBACK TRANSACTION

        Ok(Client {
            config: self.config,
            _state: PhantomData,
        })
    }

    /// Create a savepoint.
    pub async fn savepoint(&mut self, name: &str) -> Result<()> {
        validate_identifier(name)?;
        tracing::debug!(name = name, "creating savepoint");

        // Execute SAVE TRANSACTION @name
        todo!("Client::savepoint() not yet implemented")
    }

    /// Rollback to a savepoint.
    pub async fn rollback_to_savepoint(&mut self, name: &str) -> Result<()> {
        validate_identifier(name)?;
        tracing::debug!(name = name, "rolling back to savepoint");

        // Execute ROLLBACK TRANSACTION @name
        todo!("Client::rollback_to_savepoint() not yet implemented")
    }
}

/// Validate an identifier (table name, savepoint name, etc.) to prevent SQL injection.
fn validate_identifier(name: &str) -> Result<()> {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static IDENTIFIER_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_@#$]{0,127}$").unwrap());

    if name.is_empty() {
        return Err(Error::InvalidIdentifier(
            "identifier cannot be empty".into(),
        ));
    }

    if !IDENTIFIER_RE.is_match(name) {
        return Err(Error::InvalidIdentifier(format!(
            "invalid identifier '{}': must start with letter/underscore, \
             contain only alphanumerics/_/@/#/$, and be 1-128 characters",
            name
        )));
    }

    Ok(())
}

impl<S: ConnectionState> std::fmt::Debug for Client<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("database", &self.config.database)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_valid() {
        assert!(validate_identifier("my_table").is_ok());
        assert!(validate_identifier("Table123").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("sp_test").is_ok());
    }

    #[test]
    fn test_validate_identifier_invalid() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("123abc").is_err());
        assert!(validate_identifier("table-name").is_err());
        assert!(validate_identifier("table name").is_err());
        assert!(validate_identifier("table;DROP TABLE users").is_err());
    }
}
