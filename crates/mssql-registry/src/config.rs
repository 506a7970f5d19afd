//! Per-database configuration.

use mssql_driver_pool::PoolConfig;

/// Configuration for one named database, including its pool policy.
///
/// `password` is deliberately never exposed by [`crate::DatabaseInfo`] or
/// any `Debug`/logging path.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Hostname or address of the SQL Server instance.
    pub host: String,
    /// TCP port, `[1, 65535]`.
    pub port: u16,
    /// Login user.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Target database name.
    pub database: String,
    /// Driver identifier, as recorded for diagnostics (e.g. `"ODBC Driver 18 for SQL Server"`).
    pub driver: String,
    /// Connection establishment timeout, in seconds.
    pub connection_timeout_s: u64,
    /// Per-statement timeout, in seconds.
    pub query_timeout_s: u64,
    /// Whether to require TLS.
    pub encrypt: bool,
    /// Whether to trust a self-signed server certificate.
    pub trust_cert: bool,
    /// This database's connection pool policy.
    pub pool: PoolConfig,
}

/// Errors raised validating a [`DatabaseConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required string field (`host`, `user`, `password`, `database`) was empty.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
    /// `port` was not in `[1, 65535]`.
    #[error("port must be in [1, 65535], got {0}")]
    InvalidPort(u32),
}

impl DatabaseConfig {
    /// Validate the non-pool fields (`port`, `host`/`user`/`password`/`database`
    /// non-empty). Pool-field validation is [`PoolConfig::validate`]'s job.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyField { field: "host" });
        }
        if self.user.trim().is_empty() {
            return Err(ConfigError::EmptyField { field: "user" });
        }
        if self.password.is_empty() {
            return Err(ConfigError::EmptyField { field: "password" });
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::EmptyField { field: "database" });
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(0));
        }
        Ok(())
    }
}

/// Non-sensitive summary of a configured database, as returned by
/// [`crate::Registry::info`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DatabaseInfo {
    /// The alias this database is registered under.
    pub name: String,
    /// Hostname or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Target database name.
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DatabaseConfig {
        DatabaseConfig {
            host: "db.example.com".to_string(),
            port: 1433,
            user: "sa".to_string(),
            password: "secret".to_string(),
            database: "master".to_string(),
            driver: "ODBC Driver 18 for SQL Server".to_string(),
            connection_timeout_s: 30,
            query_timeout_s: 30,
            encrypt: true,
            trust_cert: false,
            pool: PoolConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn empty_host_rejected() {
        let mut config = sample();
        config.host.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_port_rejected() {
        let mut config = sample();
        config.port = 0;
        assert!(config.validate().is_err());
    }
}
