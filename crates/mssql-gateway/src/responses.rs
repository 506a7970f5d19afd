//! Success-shaped results for each pipeline operation, and the
//! success/error envelope every operation is ultimately rendered through.

use std::collections::HashMap;

use mssql_driver_pool::PoolMetrics;
use mssql_gateway_errors::create_error_response;
use mssql_registry::DatabaseInfo;
use mssql_types::SqlValue;
use serde::{Deserialize, Serialize};

/// Render a pipeline result as the `{success, ...}` envelope spec.md §6
/// describes: on `Ok`, `success: true` merged with the response's own
/// fields; on `Err`, the sanitised/simplified [`mssql_gateway_errors::ErrorResponse`].
///
/// `context` names the operation for the error path (e.g. `"execute_query"`),
/// surfaced as `error_context`.
#[must_use]
pub fn to_json_response<T, E>(result: Result<T, E>, context: &str) -> serde_json::Value
where
    T: Serialize,
    E: std::error::Error,
{
    match result {
        Ok(value) => {
            let mut rendered = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
            if let serde_json::Value::Object(ref mut map) = rendered {
                map.insert("success".to_string(), serde_json::Value::Bool(true));
            }
            rendered
        }
        Err(error) => {
            let response = create_error_response(&error.to_string(), Some(context));
            serde_json::to_value(response).unwrap_or(serde_json::Value::Null)
        }
    }
}

/// `execute_query` success shape.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// Column names, in driver order.
    pub columns: Vec<String>,
    /// Rows, each a map from column name to value.
    pub rows: Vec<HashMap<String, SqlValue>>,
    /// Number of rows returned, after truncation.
    pub row_count: usize,
    /// `true` if more than `limit` rows were available and the surplus was dropped.
    pub truncated: bool,
}

/// `execute_statement` success shape.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatementResponse {
    /// Rows affected by the statement.
    pub affected_rows: u64,
}

/// `execute_procedure` success shape: the first result set only.
#[derive(Debug, Clone, Serialize)]
pub struct ProcedureResponse {
    /// Column names of the first result set.
    pub columns: Vec<String>,
    /// Rows of the first result set.
    pub rows: Vec<HashMap<String, SqlValue>>,
    /// Number of rows in the first result set.
    pub row_count: usize,
}

/// One row of `list_tables`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// Owning schema.
    pub schema: String,
}

/// `list_tables` success shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesResponse {
    /// Every table found in `schema` (or every schema, if unspecified).
    pub tables: Vec<TableInfo>,
}

/// One column of `describe_table`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// SQL Server data type name.
    pub data_type: String,
    /// Whether the column accepts `NULL`.
    pub nullable: bool,
}

/// `describe_table` success shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeTableResponse {
    /// Every column of the described table, in ordinal order.
    pub columns: Vec<ColumnInfo>,
}

/// One row of `list_procedures`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureInfo {
    /// Procedure name.
    pub name: String,
    /// Owning schema.
    pub schema: String,
}

/// `list_procedures` success shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProceduresResponse {
    /// Every procedure found in `schema` (or every schema, if unspecified).
    pub procedures: Vec<ProcedureInfo>,
}

/// `get_view_definition`/`get_function_definition` success shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionResponse {
    /// The object's `CREATE` definition text.
    pub definition: String,
}

/// `list_databases` success shape.
#[derive(Debug, Clone, Serialize)]
pub struct DatabasesResponse {
    /// Every configured database, whether or not its handle is live.
    pub databases: Vec<DatabaseInfo>,
}

/// Per-alias entry of [`HealthResponse`].
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseHealth {
    /// `true` once this alias's handle has been constructed.
    pub materialized: bool,
    /// The alias's pool metrics, if its handle has been materialised.
    pub metrics: Option<PoolMetrics>,
}

/// `health` success shape **(added)**: per-alias pool observability.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Every configured alias's health.
    pub databases: HashMap<String, DatabaseHealth>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mssql_testing::MockError;

    #[test]
    fn ok_result_is_merged_with_a_success_flag() {
        let result: Result<StatementResponse, MockError> = Ok(StatementResponse { affected_rows: 3 });
        let rendered = to_json_response(result, "execute_statement");
        assert_eq!(rendered["success"], serde_json::json!(true));
        assert_eq!(rendered["affected_rows"], serde_json::json!(3));
    }

    #[test]
    fn err_result_never_leaks_a_password() {
        let result: Result<StatementResponse, MockError> =
            Err(MockError("Login failed for user 'sa'. PWD=hunter2;".to_string()));
        let rendered = to_json_response(result, "execute_statement");
        assert_eq!(rendered["success"], serde_json::json!(false));
        assert!(!rendered.to_string().contains("hunter2"));
    }
}
