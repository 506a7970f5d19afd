//! Exercises the request pipeline end to end against `MockConnectionFactory`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mssql_driver_pool::{Connection, ConnectionFactory};
use mssql_gateway::Gateway;
use mssql_registry::{DatabaseConfig, Registry};
use mssql_testing::{MockConnectionFactory, MockError, MockScript};
use mssql_types::SqlValue;

/// Wraps a shared [`MockConnectionFactory`] so a test can hold onto the
/// `Arc` (and therefore the call log) while the registry owns its own
/// `ConnectionFactory` value per alias.
struct SharedFactory(Arc<MockConnectionFactory>);

#[async_trait]
impl ConnectionFactory for SharedFactory {
    type Connection = <MockConnectionFactory as ConnectionFactory>::Connection;

    async fn connect(&self) -> Result<Self::Connection, MockError> {
        self.0.connect().await
    }
}

fn database_config(host: &str) -> DatabaseConfig {
    DatabaseConfig {
        host: host.to_string(),
        port: 1433,
        user: "sa".to_string(),
        password: "secret".to_string(),
        database: "master".to_string(),
        driver: "ODBC Driver 18 for SQL Server".to_string(),
        connection_timeout_s: 30,
        query_timeout_s: 30,
        encrypt: true,
        trust_cert: false,
        pool: mssql_driver_pool::PoolConfig::new().min_size(1).max_size(2),
    }
}

/// Builds a registry over two aliases (`default`, `reporting`), each backed
/// by its own `MockConnectionFactory`, and returns the gateway plus the two
/// factories so tests can inspect call logs.
fn build_gateway() -> (Gateway<SharedFactory>, Arc<MockConnectionFactory>, Arc<MockConnectionFactory>) {
    let default_factory = Arc::new(MockConnectionFactory::new());
    let reporting_factory = Arc::new(MockConnectionFactory::new());

    let mut configs = HashMap::new();
    configs.insert("default".to_string(), database_config("default.example.com"));
    configs.insert("reporting".to_string(), database_config("reporting.example.com"));

    let default_for_closure = default_factory.clone();
    let reporting_for_closure = reporting_factory.clone();
    let registry = Registry::new(configs, move |config: &DatabaseConfig| {
        if config.host == "reporting.example.com" {
            SharedFactory(reporting_for_closure.clone())
        } else {
            SharedFactory(default_for_closure.clone())
        }
    })
    .expect("default alias present");

    let query_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/query");
    let gateway = Gateway::new(Arc::new(registry), query_dir);

    (gateway, default_factory, reporting_factory)
}

fn row(columns: &[(&str, SqlValue)]) -> HashMap<String, SqlValue> {
    columns.iter().map(|(name, value)| ((*name).to_string(), value.clone())).collect()
}

#[tokio::test]
async fn read_only_happy_path_returns_shaped_rows() {
    let (gateway, default_factory, _reporting) = build_gateway();

    default_factory.update_script(|script: &mut MockScript| {
        script.query_result = mssql_handle::QueryResult {
            columns: vec!["id".to_string(), "name".to_string(), "value".to_string()],
            rows: vec![
                row(&[("id", SqlValue::Int(1)), ("name", SqlValue::from("a")), ("value", SqlValue::Int(10))]),
                row(&[("id", SqlValue::Int(2)), ("name", SqlValue::from("b")), ("value", SqlValue::Int(20))]),
                row(&[("id", SqlValue::Int(3)), ("name", SqlValue::from("c")), ("value", SqlValue::Int(30))]),
            ],
        };
    });

    let response = gateway.execute_query("default", "SELECT * FROM Users", &[], Some(100)).await.expect("query succeeds");

    assert_eq!(response.row_count, 3);
    assert!(!response.truncated);
    assert_eq!(response.columns, vec!["id", "name", "value"]);
}

#[tokio::test]
async fn more_rows_than_limit_are_truncated() {
    let (gateway, default_factory, _reporting) = build_gateway();

    let rows: Vec<_> = (0..200).map(|i| row(&[("id", SqlValue::Int(i))])).collect();
    default_factory.update_script(|script: &mut MockScript| {
        script.query_result = mssql_handle::QueryResult { columns: vec!["id".to_string()], rows };
    });

    let response = gateway.execute_query("default", "SELECT * FROM Users", &[], Some(100)).await.expect("query succeeds");

    assert_eq!(response.row_count, 100);
    assert!(response.truncated);
}

#[tokio::test]
async fn blocked_keyword_is_rejected_without_touching_the_pool() {
    let (gateway, default_factory, _reporting) = build_gateway();

    let error = gateway.execute_query("default", "DROP TABLE Users", &[], None).await.unwrap_err();
    assert_eq!(error.to_string(), "Blocked keyword detected: DROP");
    assert_eq!(default_factory.created_count(), 0);
}

#[tokio::test]
async fn select_is_rejected_from_execute_statement() {
    let (gateway, _default, _reporting) = build_gateway();

    let error = gateway.execute_statement("default", "SELECT * FROM Users", &[]).await.unwrap_err();
    assert!(error.to_string().contains("execute_query"));
}

#[tokio::test]
async fn statement_returns_affected_rows() {
    let (gateway, default_factory, _reporting) = build_gateway();
    default_factory.update_script(|script: &mut MockScript| script.affected_rows = 7);

    let response = gateway.execute_statement("default", "UPDATE Users SET active = 1", &[]).await.expect("statement succeeds");
    assert_eq!(response.affected_rows, 7);
}

#[tokio::test]
async fn query_file_rejects_path_traversal_without_filesystem_access() {
    let (gateway, _default, _reporting) = build_gateway();

    let error = gateway.execute_query_file("default", "../../etc/passwd", &[], None).await.unwrap_err();
    assert_eq!(error.to_string(), "Invalid filename");
}

#[tokio::test]
async fn query_file_reads_and_dispatches_to_execute_query() {
    let (gateway, default_factory, _reporting) = build_gateway();
    default_factory.update_script(|script: &mut MockScript| {
        script.query_result = mssql_handle::QueryResult {
            columns: vec!["id".to_string()],
            rows: vec![row(&[("id", SqlValue::Int(1))])],
        };
    });

    let response = gateway.execute_query_file("default", "top_users", &[], None).await.expect("file dispatches");
    assert_eq!(response.row_count, 1);

    let logged = default_factory.log();
    assert!(logged.queries[0].contains("SELECT * FROM Users"));
}

#[tokio::test]
async fn unknown_database_reports_the_alias() {
    let (gateway, _default, _reporting) = build_gateway();

    let error = gateway.execute_query("ghost", "SELECT 1", &[], None).await.unwrap_err();
    assert!(error.to_string().contains("ghost"));
}

#[tokio::test]
async fn procedure_call_binds_parameters_in_order_and_returns_first_result_set() {
    let (gateway, default_factory, _reporting) = build_gateway();
    default_factory.update_script(|script: &mut MockScript| {
        script.query_result =
            mssql_handle::QueryResult { columns: vec!["out".to_string()], rows: vec![row(&[("out", SqlValue::Int(1))])] };
    });

    let params = vec![("user_id".to_string(), SqlValue::Int(42)), ("active".to_string(), SqlValue::Bit(true))];
    let response = gateway.execute_procedure("default", "dbo", "GetUser", &params).await.expect("procedure succeeds");

    assert_eq!(response.row_count, 1);
    let logged = default_factory.log();
    assert_eq!(logged.queries[0], "EXEC [dbo].[GetUser] @user_id=?, @active=?");
}

#[tokio::test]
async fn list_tables_is_cached_per_database() {
    let (gateway, default_factory, reporting_factory) = build_gateway();
    default_factory.update_script(|script: &mut MockScript| {
        script.query_result = mssql_handle::QueryResult {
            columns: vec!["TABLE_NAME".to_string(), "TABLE_SCHEMA".to_string()],
            rows: vec![row(&[("TABLE_NAME", SqlValue::from("Users")), ("TABLE_SCHEMA", SqlValue::from("dbo"))])],
        };
    });
    reporting_factory.update_script(|script: &mut MockScript| {
        script.query_result = mssql_handle::QueryResult {
            columns: vec!["TABLE_NAME".to_string(), "TABLE_SCHEMA".to_string()],
            rows: vec![row(&[("TABLE_NAME", SqlValue::from("Orders")), ("TABLE_SCHEMA", SqlValue::from("dbo"))])],
        };
    });

    let first = gateway.list_tables("default", None).await.expect("list succeeds");
    assert_eq!(first.tables[0].name, "Users");

    let second = gateway.list_tables("reporting", None).await.expect("list succeeds");
    assert_eq!(second.tables[0].name, "Orders");

    let repeat = gateway.list_tables("default", None).await.expect("list succeeds");
    assert_eq!(repeat.tables[0].name, "Users");

    assert_eq!(default_factory.log().queries.len(), 1);
    assert_eq!(reporting_factory.log().queries.len(), 1);
}

#[tokio::test]
async fn view_definition_not_found_reports_the_qualified_name() {
    let (gateway, default_factory, _reporting) = build_gateway();
    default_factory.update_script(|script: &mut MockScript| {
        script.query_result = mssql_handle::QueryResult { columns: vec![], rows: vec![] };
    });

    let error = gateway.get_view_definition("default", "dbo", "GhostView").await.unwrap_err();
    assert_eq!(error.to_string(), "View not found: [dbo].[GhostView]");
}

#[tokio::test]
async fn list_databases_reports_every_configured_alias() {
    let (gateway, _default, _reporting) = build_gateway();

    let response = gateway.list_databases();
    let mut names: Vec<_> = response.databases.iter().map(|info| info.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["default".to_string(), "reporting".to_string()]);
}

#[tokio::test]
async fn health_reports_materialisation_state() {
    let (gateway, _default, _reporting) = build_gateway();

    gateway.execute_query("default", "SELECT 1", &[], None).await.expect("query succeeds");

    let health = gateway.health().await;
    assert!(health.databases["default"].materialized);
    assert!(health.databases["default"].metrics.is_some());
    assert!(!health.databases["reporting"].materialized);
}
