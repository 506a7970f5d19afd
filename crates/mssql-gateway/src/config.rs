//! Environment-sourced gateway configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use mssql_driver_pool::PoolConfig;
use mssql_registry::{ConfigError, DatabaseConfig};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static ALIAS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,63}$").expect("valid pattern"));

/// The reserved alias that is always present, regardless of `DB_DATABASES`.
pub const DEFAULT_ALIAS: &str = "default";

/// `true` iff `alias` matches `[A-Za-z][A-Za-z0-9_]{0,63}`.
#[must_use]
pub fn is_valid_alias(alias: &str) -> bool {
    ALIAS_PATTERN.is_match(alias)
}

/// An injectable source of environment-like key/value configuration.
///
/// Generalizes reading `std::env` directly so tests can supply a fixed map
/// instead of mutating process environment.
pub trait EnvSource {
    /// Look up `key`, returning `None` if unset.
    fn get(&self, key: &str) -> Option<String>;
}

/// An [`EnvSource`] backed by a fixed map, for tests and explicit
/// configuration construction.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource(pub HashMap<String, String>);

impl EnvSource for MapEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// An [`EnvSource`] backed by the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Errors constructing a [`GatewayConfig`] from an [`EnvSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayConfigError {
    /// A required key was absent from the source.
    #[error("missing required environment variable: {0}")]
    MissingField(String),
    /// A key was present but could not be parsed as the expected type.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// The offending key.
        field: String,
        /// The value that failed to parse.
        value: String,
    },
    /// A database alias in `DB_DATABASES` failed [`is_valid_alias`].
    #[error("invalid database alias: {0}")]
    InvalidAlias(String),
    /// A fully-constructed [`DatabaseConfig`] failed [`DatabaseConfig::validate`].
    #[error("invalid database configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// The gateway's full environment-sourced configuration: every configured
/// database, plus the query-file directory.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Every configured database, keyed by alias. Always contains `"default"`.
    pub databases: HashMap<String, DatabaseConfig>,
    /// Directory `execute_query_file` resolves filenames against.
    pub query_dir: PathBuf,
}

impl GatewayConfig {
    /// Build a [`GatewayConfig`] from an [`EnvSource`], per spec.md §6's
    /// configuration surface.
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, GatewayConfigError> {
        let mut databases = HashMap::new();
        databases.insert(DEFAULT_ALIAS.to_string(), database_config(env, None)?);

        if let Some(list) = env.get("DB_DATABASES") {
            for raw_alias in list.split(',') {
                let alias = raw_alias.trim();
                if alias.is_empty() || alias.eq_ignore_ascii_case(DEFAULT_ALIAS) {
                    continue;
                }
                if !is_valid_alias(alias) {
                    return Err(GatewayConfigError::InvalidAlias(alias.to_string()));
                }
                databases.insert(alias.to_string(), database_config(env, Some(alias))?);
            }
        }

        let query_dir = env.get("QUERY_DIR").map_or_else(|| PathBuf::from("query"), PathBuf::from);

        Ok(Self { databases, query_dir })
    }
}

fn prefixed_key(alias: Option<&str>, suffix: &str) -> String {
    match alias {
        Some(alias) => format!("DB_{}_{suffix}", alias.to_uppercase()),
        None => format!("DB_{suffix}"),
    }
}

fn required(env: &dyn EnvSource, key: &str) -> Result<String, GatewayConfigError> {
    env.get(key).filter(|value| !value.is_empty()).ok_or_else(|| GatewayConfigError::MissingField(key.to_string()))
}

fn parse_u64(env: &dyn EnvSource, key: &str, default: u64) -> Result<u64, GatewayConfigError> {
    match env.get(key) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| GatewayConfigError::InvalidValue { field: key.to_string(), value }),
    }
}

fn parse_u32(env: &dyn EnvSource, key: &str, default: u32) -> Result<u32, GatewayConfigError> {
    match env.get(key) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| GatewayConfigError::InvalidValue { field: key.to_string(), value }),
    }
}

fn parse_bool(env: &dyn EnvSource, key: &str, default: bool) -> bool {
    env.get(key)
        .map(|value| matches!(value.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn database_config(env: &dyn EnvSource, alias: Option<&str>) -> Result<DatabaseConfig, GatewayConfigError> {
    let host = required(env, &prefixed_key(alias, "HOST"))?;
    let port = parse_u32(env, &prefixed_key(alias, "PORT"), 1433)?;
    let user = required(env, &prefixed_key(alias, "USER"))?;
    let password = required(env, &prefixed_key(alias, "PASSWORD"))?;
    let database = required(env, &prefixed_key(alias, "NAME"))?;
    let driver = env.get(&prefixed_key(alias, "DRIVER")).unwrap_or_else(|| "ODBC Driver 18 for SQL Server".to_string());
    let connection_timeout_s = parse_u64(env, &prefixed_key(alias, "TIMEOUT"), 30)?;
    let query_timeout_s = parse_u64(env, &prefixed_key(alias, "QUERY_TIMEOUT"), 30)?;
    let encrypt = parse_bool(env, &prefixed_key(alias, "ENCRYPT"), true);
    let trust_cert = parse_bool(env, &prefixed_key(alias, "TRUST_CERT"), false);

    let pool_prefix = match alias {
        Some(alias) => format!("DB_{}_POOL", alias.to_uppercase()),
        None => "DB_POOL".to_string(),
    };
    let pool = PoolConfig::new()
        .min_size(parse_u32(env, &format!("{pool_prefix}_MIN_SIZE"), 1)?)
        .max_size(parse_u32(env, &format!("{pool_prefix}_MAX_SIZE"), 10)?)
        .idle_timeout(Duration::from_secs(parse_u64(env, &format!("{pool_prefix}_IDLE_TIMEOUT"), 600)?))
        .health_check_interval(Duration::from_secs(parse_u64(
            env,
            &format!("{pool_prefix}_HEALTH_CHECK_INTERVAL"),
            30,
        )?))
        .max_lifetime(Duration::from_secs(parse_u64(env, &format!("{pool_prefix}_MAX_LIFETIME"), 1800)?))
        .acquire_timeout(Duration::from_secs(parse_u64(env, &format!("{pool_prefix}_ACQUIRE_TIMEOUT"), 30)?));

    let port = u16::try_from(port)
        .map_err(|_| GatewayConfigError::InvalidValue { field: prefixed_key(alias, "PORT"), value: port.to_string() })?;

    let config = DatabaseConfig {
        host,
        port,
        user,
        password,
        database,
        driver,
        connection_timeout_s,
        query_timeout_s,
        encrypt,
        trust_cert,
        pool,
    };
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> MapEnvSource {
        MapEnvSource(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn is_valid_alias_accepts_and_rejects() {
        assert!(is_valid_alias("default"));
        assert!(is_valid_alias("reporting_db"));
        assert!(!is_valid_alias("1start"));
        assert!(!is_valid_alias(""));
    }

    #[test]
    fn from_env_requires_primary_fields() {
        let result = GatewayConfig::from_env(&env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn from_env_builds_default_database() {
        let env = env(&[
            ("DB_HOST", "db.example.com"),
            ("DB_USER", "sa"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "master"),
        ]);
        let config = GatewayConfig::from_env(&env).expect("config");
        assert!(config.databases.contains_key("default"));
        assert_eq!(config.databases["default"].host, "db.example.com");
    }

    #[test]
    fn db_databases_does_not_duplicate_default() {
        let env = env(&[
            ("DB_HOST", "db.example.com"),
            ("DB_USER", "sa"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "master"),
            ("DB_DATABASES", "default,reporting"),
            ("DB_REPORTING_HOST", "reporting.example.com"),
            ("DB_REPORTING_USER", "sa"),
            ("DB_REPORTING_PASSWORD", "secret"),
            ("DB_REPORTING_NAME", "reports"),
        ]);
        let config = GatewayConfig::from_env(&env).expect("config");
        assert_eq!(config.databases.len(), 2);
        assert!(config.databases.contains_key("reporting"));
    }

    #[test]
    fn zero_port_is_rejected_at_construction() {
        let env = env(&[
            ("DB_HOST", "db.example.com"),
            ("DB_USER", "sa"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "master"),
            ("DB_PORT", "0"),
        ]);
        let result = GatewayConfig::from_env(&env);
        assert!(matches!(result, Err(GatewayConfigError::Invalid(_))));
    }

    #[test]
    fn query_dir_defaults_to_query() {
        let env = env(&[
            ("DB_HOST", "db.example.com"),
            ("DB_USER", "sa"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "master"),
        ]);
        let config = GatewayConfig::from_env(&env).expect("config");
        assert_eq!(config.query_dir, PathBuf::from("query"));
    }
}
