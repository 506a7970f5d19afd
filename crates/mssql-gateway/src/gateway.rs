//! The request pipeline: validate, rewrite, execute, audit, shape.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mssql_driver_pool::{Connection, ConnectionFactory};
use mssql_handle::SqlConnection;
use mssql_policy::{sanitize_table_name, validate_identifier, validate_procedure_name, validate_query, PolicyViolation};
use mssql_registry::Registry;
use mssql_types::SqlValue;
use ttl_cache::{memoize_key, Cache};

use crate::audit::{fingerprint, preview, AuditRecord};
use crate::error::GatewayError;
use crate::responses::{
    ColumnInfo, DatabaseHealth, DatabasesResponse, DefinitionResponse, DescribeTableResponse, HealthResponse,
    ProcedureInfo, ProcedureResponse, ProceduresResponse, QueryResponse, StatementResponse, TableInfo, TablesResponse,
};

/// Minimum/maximum accepted row limits for [`Gateway::execute_query`].
const MIN_LIMIT: u32 = 1;
const MAX_LIMIT: u32 = 10_000;
const DEFAULT_LIMIT: u32 = 1_000;

/// Full-preview length for successful-operation audits; validation-failure
/// previews are half that, per spec.md §6.
const AUDIT_PREVIEW_LEN: usize = 100;
const VALIDATION_PREVIEW_LEN: usize = 50;

/// TTL applied to every cached introspection answer.
const INTROSPECTION_TTL: Duration = Duration::from_secs(60);

type Err<F> = <<F as ConnectionFactory>::Connection as Connection>::Error;

/// The ten named operations of the request pipeline, wired against one
/// [`Registry`] and one shared [`Cache`].
///
/// Owns no connections directly: every operation resolves an alias through
/// the registry, borrows a connection for the duration of the call, and
/// returns it before the call completes.
pub struct Gateway<F: ConnectionFactory>
where
    F::Connection: SqlConnection,
{
    registry: Arc<Registry<F>>,
    cache: Cache<serde_json::Value>,
    query_dir: PathBuf,
}

impl<F: ConnectionFactory> Gateway<F>
where
    F::Connection: SqlConnection,
{
    /// Wrap an already-constructed registry.
    #[must_use]
    pub fn new(registry: Arc<Registry<F>>, query_dir: PathBuf) -> Self {
        Self { registry, cache: Cache::new(INTROSPECTION_TTL), query_dir }
    }

    /// The underlying registry, for direct `info()`/`close()` access.
    #[must_use]
    pub fn registry(&self) -> &Arc<Registry<F>> {
        &self.registry
    }

    fn audit_validation_failure(&self, database: &str, sql: Option<&str>, reason: &str, started: Instant, blocked_keyword: Option<String>) {
        let record = AuditRecord::ValidationFailed {
            database: database.to_string(),
            sql_hash: sql.map(fingerprint),
            sql_preview: sql.map(|s| preview(s, VALIDATION_PREVIEW_LEN)),
            duration_ms: elapsed_ms(started),
            reason: reason.to_string(),
            blocked_keyword,
        };
        record.emit();
    }

    fn violation_audit(&self, database: &str, sql: &str, violation: &PolicyViolation, started: Instant) {
        let blocked_keyword = match violation {
            PolicyViolation::BlockedKeyword(keyword) => Some(keyword.clone()),
            _ => None,
        };
        self.audit_validation_failure(database, Some(sql), &violation.to_string(), started, blocked_keyword);
    }

    /// `execute_query(sql, params?, limit=1000, database="default")`.
    pub async fn execute_query(
        &self,
        database: &str,
        sql: &str,
        params: &[SqlValue],
        limit: Option<u32>,
    ) -> Result<QueryResponse, GatewayError<Err<F>>> {
        let started = Instant::now();
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(MIN_LIMIT, MAX_LIMIT);

        if let Err(violation) = validate_query(sql, false) {
            self.violation_audit(database, sql, &violation, started);
            return Err(violation.into());
        }

        let fetch_ceiling = u64::from(limit) + 1;
        let wrapped = format!("SELECT TOP ({fetch_ceiling}) * FROM ({sql}) AS _limited_query");

        let handle = self.registry.get(database).await?;
        let result = handle.query(&wrapped, params).await;

        let response = match &result {
            Ok(query_result) => {
                let truncated = query_result.rows.len() as u64 > u64::from(limit);
                let mut rows = query_result.rows.clone();
                rows.truncate(limit as usize);
                QueryResponse { columns: query_result.columns.clone(), row_count: rows.len(), rows, truncated }
            }
            Err(_) => QueryResponse { columns: Vec::new(), rows: Vec::new(), row_count: 0, truncated: false },
        };

        AuditRecord::QueryExecuted {
            database: database.to_string(),
            sql_hash: fingerprint(sql),
            sql_preview: preview(sql, AUDIT_PREVIEW_LEN),
            duration_ms: elapsed_ms(started),
            success: result.is_ok(),
            row_count: response.row_count,
            truncated: response.truncated,
        }
        .emit();

        result.map(|_| response).map_err(Into::into)
    }

    /// `execute_statement(sql, params?, database)`.
    pub async fn execute_statement(
        &self,
        database: &str,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<StatementResponse, GatewayError<Err<F>>> {
        let started = Instant::now();

        if let Err(violation) = validate_query(sql, true) {
            self.violation_audit(database, sql, &violation, started);
            return Err(violation.into());
        }

        let first_token = sql.trim_start().split_whitespace().next().unwrap_or("").to_uppercase();
        if first_token == "SELECT" || first_token == "WITH" {
            let violation = PolicyViolation::DisallowedStatementType(
                "SELECT is not a statement; use execute_query instead".to_string(),
            );
            self.violation_audit(database, sql, &violation, started);
            return Err(violation.into());
        }

        let handle = self.registry.get(database).await?;
        let result = handle.exec(sql, params).await;

        AuditRecord::StatementExecuted {
            database: database.to_string(),
            sql_hash: fingerprint(sql),
            sql_preview: preview(sql, AUDIT_PREVIEW_LEN),
            duration_ms: elapsed_ms(started),
            success: result.is_ok(),
            affected_rows: result.as_ref().copied().unwrap_or(0),
        }
        .emit();

        result.map(|affected_rows| StatementResponse { affected_rows }).map_err(Into::into)
    }

    /// `execute_query_file(filename, database)`.
    pub async fn execute_query_file(
        &self,
        database: &str,
        filename: &str,
        params: &[SqlValue],
        limit: Option<u32>,
    ) -> Result<QueryResponse, GatewayError<Err<F>>> {
        let named = if filename.ends_with(".sql") { filename.to_string() } else { format!("{filename}.sql") };

        let valid_name = named.strip_suffix(".sql").is_some_and(|stem| {
            !stem.is_empty() && stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });
        if !valid_name {
            return Err(GatewayError::InvalidFilename);
        }

        let resolved = self.query_dir.join(&named);
        let canonical_dir = std::fs::canonicalize(&self.query_dir).unwrap_or_else(|_| self.query_dir.clone());
        let canonical_file = std::fs::canonicalize(&resolved).map_err(GatewayError::Io)?;
        if !canonical_file.starts_with(&canonical_dir) {
            return Err(GatewayError::PathTraversal);
        }

        let sql = std::fs::read_to_string(&canonical_file).map_err(GatewayError::Io)?;
        self.execute_query(database, &sql, params, limit).await
    }

    /// `execute_procedure(name, schema, params?, database)`.
    ///
    /// `params` retains caller insertion order so bound placeholders line up
    /// with the emitted `@name=?` clauses.
    pub async fn execute_procedure(
        &self,
        database: &str,
        schema: &str,
        name: &str,
        params: &[(String, SqlValue)],
    ) -> Result<ProcedureResponse, GatewayError<Err<F>>> {
        let started = Instant::now();

        if let Err(violation) = validate_procedure_name(name) {
            self.audit_validation_failure(database, None, &violation.to_string(), started, None);
            return Err(violation.into());
        }
        if let Err(violation) = validate_identifier(schema) {
            self.audit_validation_failure(database, None, &violation.to_string(), started, None);
            return Err(violation.into());
        }
        if let Err(violation) = validate_identifier(name) {
            self.audit_validation_failure(database, None, &violation.to_string(), started, None);
            return Err(violation.into());
        }
        for (param_name, _) in params {
            if let Err(violation) = validate_identifier(param_name) {
                self.audit_validation_failure(database, None, &violation.to_string(), started, None);
                return Err(violation.into());
            }
        }

        let qualified = format!("[{schema}].[{name}]");
        let placeholders: Vec<String> = params.iter().map(|(param_name, _)| format!("@{param_name}=?")).collect();
        let exec_sql = if placeholders.is_empty() {
            format!("EXEC {qualified}")
        } else {
            format!("EXEC {qualified} {}", placeholders.join(", "))
        };
        let values: Vec<SqlValue> = params.iter().map(|(_, value)| value.clone()).collect();

        let handle = self.registry.get(database).await?;
        let result = handle.query(&exec_sql, &values).await;

        AuditRecord::ProcedureExecuted {
            database: database.to_string(),
            sql_hash: fingerprint(&exec_sql),
            sql_preview: preview(&exec_sql, AUDIT_PREVIEW_LEN),
            duration_ms: elapsed_ms(started),
            success: result.is_ok(),
            procedure: qualified,
        }
        .emit();

        result
            .map(|query_result| ProcedureResponse {
                columns: query_result.columns,
                row_count: query_result.rows.len(),
                rows: query_result.rows,
            })
            .map_err(Into::into)
    }

    /// `list_tables(schema?, database)`, cached 60s, keyed by database+schema.
    pub async fn list_tables(&self, database: &str, schema: Option<&str>) -> Result<TablesResponse, GatewayError<Err<F>>> {
        if let Some(schema) = schema {
            validate_identifier(schema)?;
        }
        let key = memoize_key("list_tables", &[], &[("database", database), ("schema", schema.unwrap_or(""))]);

        let value = self
            .cache
            .get_or_try_compute(key, || async {
                let handle = self.registry.get(database).await?;
                let sql = match schema {
                    Some(_) => {
                        "SELECT TABLE_NAME, TABLE_SCHEMA FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = ?"
                            .to_string()
                    }
                    None => "SELECT TABLE_NAME, TABLE_SCHEMA FROM INFORMATION_SCHEMA.TABLES".to_string(),
                };
                let params: Vec<SqlValue> = schema.map(|s| vec![SqlValue::from(s)]).unwrap_or_default();
                let result = handle.query(&sql, &params).await?;
                let tables = rows_to_tables(&result.rows);
                Ok(to_cache_value(&TablesResponse { tables }))
            })
            .await?;

        Ok(from_cache_value(value))
    }

    /// `describe_table(name, schema, database)`, cached 60s.
    pub async fn describe_table(
        &self,
        database: &str,
        schema: &str,
        name: &str,
    ) -> Result<DescribeTableResponse, GatewayError<Err<F>>> {
        validate_identifier(schema)?;
        validate_identifier(name)?;
        let key = memoize_key("describe_table", &[], &[("database", database), ("schema", schema), ("name", name)]);

        let value = self
            .cache
            .get_or_try_compute(key, || async {
                let handle = self.registry.get(database).await?;
                let sql = "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE FROM INFORMATION_SCHEMA.COLUMNS \
                           WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION";
                let params = [SqlValue::from(schema), SqlValue::from(name)];
                let result = handle.query(sql, &params).await?;
                let columns = result
                    .rows
                    .iter()
                    .map(|row| ColumnInfo {
                        name: text(row, "COLUMN_NAME"),
                        data_type: text(row, "DATA_TYPE"),
                        nullable: text(row, "IS_NULLABLE").eq_ignore_ascii_case("YES"),
                    })
                    .collect();
                Ok(to_cache_value(&DescribeTableResponse { columns }))
            })
            .await?;

        Ok(from_cache_value(value))
    }

    /// `list_procedures(schema?, database)`, cached 60s.
    pub async fn list_procedures(
        &self,
        database: &str,
        schema: Option<&str>,
    ) -> Result<ProceduresResponse, GatewayError<Err<F>>> {
        if let Some(schema) = schema {
            validate_identifier(schema)?;
        }
        let key = memoize_key("list_procedures", &[], &[("database", database), ("schema", schema.unwrap_or(""))]);

        let value = self
            .cache
            .get_or_try_compute(key, || async {
                let handle = self.registry.get(database).await?;
                let sql = match schema {
                    Some(_) => {
                        "SELECT ROUTINE_NAME, ROUTINE_SCHEMA FROM INFORMATION_SCHEMA.ROUTINES \
                         WHERE ROUTINE_TYPE = 'PROCEDURE' AND ROUTINE_SCHEMA = ?"
                            .to_string()
                    }
                    None => {
                        "SELECT ROUTINE_NAME, ROUTINE_SCHEMA FROM INFORMATION_SCHEMA.ROUTINES \
                         WHERE ROUTINE_TYPE = 'PROCEDURE'"
                            .to_string()
                    }
                };
                let params: Vec<SqlValue> = schema.map(|s| vec![SqlValue::from(s)]).unwrap_or_default();
                let result = handle.query(&sql, &params).await?;
                let procedures = result
                    .rows
                    .iter()
                    .map(|row| ProcedureInfo { name: text(row, "ROUTINE_NAME"), schema: text(row, "ROUTINE_SCHEMA") })
                    .collect();
                Ok(to_cache_value(&ProceduresResponse { procedures }))
            })
            .await?;

        Ok(from_cache_value(value))
    }

    /// `get_view_definition(name, schema, database)`, cached 60s.
    pub async fn get_view_definition(
        &self,
        database: &str,
        schema: &str,
        name: &str,
    ) -> Result<DefinitionResponse, GatewayError<Err<F>>> {
        self.get_definition(database, schema, name, "View").await
    }

    /// `get_function_definition(name, schema, database)`, cached 60s.
    pub async fn get_function_definition(
        &self,
        database: &str,
        schema: &str,
        name: &str,
    ) -> Result<DefinitionResponse, GatewayError<Err<F>>> {
        self.get_definition(database, schema, name, "Function").await
    }

    async fn get_definition(
        &self,
        database: &str,
        schema: &str,
        name: &str,
        kind: &'static str,
    ) -> Result<DefinitionResponse, GatewayError<Err<F>>> {
        let qualified = sanitize_table_name(name, schema)?;
        let key = memoize_key(
            &format!("get_{}_definition", kind.to_lowercase()),
            &[],
            &[("database", database), ("schema", schema), ("name", name)],
        );

        if let Some(cached) = self.cache.get(&key) {
            return Ok(from_cache_value(cached));
        }

        let handle = self.registry.get(database).await?;
        let sql = "SELECT OBJECT_DEFINITION(OBJECT_ID(?))";
        let result = handle.query(sql, &[SqlValue::from(qualified.clone())]).await?;

        let definition = result
            .rows
            .first()
            .and_then(|row| row.values().next())
            .and_then(|value| match value {
                SqlValue::Text(text) => Some(text.clone()),
                _ => None,
            });

        match definition {
            Some(definition) => {
                let response = DefinitionResponse { definition };
                self.cache.set(key, to_cache_value(&response));
                Ok(response)
            }
            None => Err(GatewayError::ObjectNotFound { kind, qualified }),
        }
    }

    /// `list_databases()`.
    #[must_use]
    pub fn list_databases(&self) -> DatabasesResponse {
        DatabasesResponse { databases: self.registry.info() }
    }

    /// `health()` **(added)**: per-alias materialisation state and pool
    /// metrics, for operators.
    pub async fn health(&self) -> HealthResponse {
        let mut databases = HashMap::new();
        for info in self.registry.info() {
            let handle = self.registry.get(&info.name).await.ok();
            let entry = match handle {
                Some(handle) => DatabaseHealth { materialized: true, metrics: Some(handle.pool().metrics()) },
                None => DatabaseHealth { materialized: false, metrics: None },
            };
            databases.insert(info.name, entry);
        }
        HealthResponse { databases }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn text(row: &HashMap<String, SqlValue>, column: &str) -> String {
    match row.get(column) {
        Some(SqlValue::Text(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn rows_to_tables(rows: &[HashMap<String, SqlValue>]) -> Vec<TableInfo> {
    rows.iter().map(|row| TableInfo { name: text(row, "TABLE_NAME"), schema: text(row, "TABLE_SCHEMA") }).collect()
}

fn to_cache_value<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).expect("response shapes are plain data and always serialize")
}

fn from_cache_value<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).expect("cache only ever holds values written by to_cache_value")
}
