//! Integration tests for `Registry` against mock connections.

use std::collections::HashMap;

use mssql_driver_pool::PoolConfig;
use mssql_registry::{DatabaseConfig, Registry};
use mssql_testing::MockConnectionFactory;

fn config() -> DatabaseConfig {
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
        pool: PoolConfig::new().min_size(1).max_size(2),
    }
}

fn configs(aliases: &[&str]) -> HashMap<String, DatabaseConfig> {
    aliases.iter().map(|alias| (alias.to_string(), config())).collect()
}

#[tokio::test]
async fn get_constructs_the_handle_lazily_and_caches_it() {
    let registry = Registry::new(configs(&["default"]), |_cfg| MockConnectionFactory::new()).expect("registry");

    let first = registry.get("default").await.expect("first get");
    let second = registry.get("default").await.expect("second get");
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn unknown_alias_reports_available_aliases() {
    let registry = Registry::new(configs(&["default", "reporting"]), |_cfg| MockConnectionFactory::new())
        .expect("registry");

    let error = registry.get("ghost").await.unwrap_err();
    let message = error.to_string();
    assert!(message.contains("ghost"));
}

#[tokio::test]
async fn info_lists_every_configured_alias_without_constructing_handles() {
    let registry = Registry::new(configs(&["default", "reporting"]), |_cfg| MockConnectionFactory::new())
        .expect("registry");

    let info = registry.info();
    let names: Vec<_> = info.iter().map(|entry| entry.name.as_str()).collect();
    assert!(names.contains(&"default"));
    assert!(names.contains(&"reporting"));
}

#[tokio::test]
async fn close_one_removes_a_single_handle() {
    let registry = Registry::new(configs(&["default", "reporting"]), |_cfg| MockConnectionFactory::new())
        .expect("registry");

    registry.get("reporting").await.expect("get reporting");
    registry.close_one("reporting").await.expect("close reporting");

    let error = registry.close_one("reporting").await.unwrap_err();
    assert!(error.to_string().contains("reporting"));
}

#[tokio::test]
async fn construction_requires_a_default_alias() {
    let result = Registry::new(configs(&["reporting"]), |_cfg| MockConnectionFactory::new());
    assert!(result.is_err());
}
