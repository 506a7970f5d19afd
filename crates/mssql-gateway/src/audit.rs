//! Audit records: one structured event per pipeline operation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid pattern"));

/// First 16 hex characters of SHA-256 over the raw SQL bytes.
#[must_use]
pub fn fingerprint(sql: &str) -> String {
    let digest = Sha256::digest(sql.as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// Whitespace-collapsed, length-bounded rendering of `sql` for audit display.
#[must_use]
pub fn preview(sql: &str, max_len: usize) -> String {
    let collapsed = WHITESPACE.replace_all(sql.trim(), " ").into_owned();
    if collapsed.chars().count() <= max_len {
        collapsed
    } else {
        let truncated: String = collapsed.chars().take(max_len).collect();
        format!("{truncated}…")
    }
}

/// A structured audit event, one of the four kinds spec.md §3 names.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum AuditRecord {
    /// `execute_query` completed (successfully or not).
    #[serde(rename = "QUERY_EXECUTED")]
    QueryExecuted {
        /// Database alias targeted.
        database: String,
        /// SQL fingerprint.
        sql_hash: String,
        /// SQL preview.
        sql_preview: String,
        /// Elapsed time.
        duration_ms: u64,
        /// Whether the operation succeeded.
        success: bool,
        /// Rows returned (after truncation).
        row_count: usize,
        /// Whether the result was truncated to `limit`.
        truncated: bool,
    },
    /// `execute_statement` completed (successfully or not).
    #[serde(rename = "STATEMENT_EXECUTED")]
    StatementExecuted {
        /// Database alias targeted.
        database: String,
        /// SQL fingerprint.
        sql_hash: String,
        /// SQL preview.
        sql_preview: String,
        /// Elapsed time.
        duration_ms: u64,
        /// Whether the operation succeeded.
        success: bool,
        /// Rows affected by the statement.
        affected_rows: u64,
    },
    /// `execute_procedure` completed (successfully or not).
    #[serde(rename = "PROCEDURE_EXECUTED")]
    ProcedureExecuted {
        /// Database alias targeted.
        database: String,
        /// SQL fingerprint of the constructed `EXEC` statement.
        sql_hash: String,
        /// SQL preview of the constructed `EXEC` statement.
        sql_preview: String,
        /// Elapsed time.
        duration_ms: u64,
        /// Whether the operation succeeded.
        success: bool,
        /// `[schema].[name]` of the invoked procedure.
        procedure: String,
    },
    /// Any operation's input failed policy validation before a connection
    /// was ever acquired.
    #[serde(rename = "VALIDATION_FAILED")]
    ValidationFailed {
        /// Database alias the caller asked for.
        database: String,
        /// SQL fingerprint, if SQL text was available to hash.
        #[serde(skip_serializing_if = "Option::is_none")]
        sql_hash: Option<String>,
        /// SQL preview, if SQL text was available to preview.
        #[serde(skip_serializing_if = "Option::is_none")]
        sql_preview: Option<String>,
        /// Elapsed time.
        duration_ms: u64,
        /// The human-readable validation failure reason.
        reason: String,
        /// The specific blocked keyword, when that was the failure reason.
        #[serde(skip_serializing_if = "Option::is_none")]
        blocked_keyword: Option<String>,
    },
}

impl AuditRecord {
    /// Emit this record as a `tracing` event: `info` on success, `warn`
    /// otherwise.
    pub fn emit(&self) {
        match self {
            AuditRecord::QueryExecuted { database, sql_hash, success, row_count, truncated, duration_ms, .. } => {
                tracing::info!(
                    event = "QUERY_EXECUTED", database, sql_hash, success, row_count, truncated, duration_ms
                );
            }
            AuditRecord::StatementExecuted { database, sql_hash, success, affected_rows, duration_ms, .. } => {
                tracing::info!(
                    event = "STATEMENT_EXECUTED", database, sql_hash, success, affected_rows, duration_ms
                );
            }
            AuditRecord::ProcedureExecuted { database, sql_hash, success, procedure, duration_ms, .. } => {
                tracing::info!(
                    event = "PROCEDURE_EXECUTED", database, sql_hash, success, procedure, duration_ms
                );
            }
            AuditRecord::ValidationFailed { database, reason, duration_ms, blocked_keyword, .. } => {
                tracing::warn!(
                    event = "VALIDATION_FAILED", database, reason, blocked_keyword, duration_ms
                );
            }
        }
    }

    /// Render as a `serde_json::Value`, for callers that persist audit
    /// records downstream.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_sixteen_hex_chars() {
        let fp = fingerprint("SELECT 1");
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(fingerprint("SELECT 1"), fingerprint("SELECT 1"));
        assert_ne!(fingerprint("SELECT 1"), fingerprint("SELECT 2"));
    }

    #[test]
    fn preview_collapses_whitespace() {
        assert_eq!(preview("SELECT   *\n FROM   Users", 100), "SELECT * FROM Users");
    }

    #[test]
    fn preview_truncates_with_ellipsis() {
        let long_sql = "SELECT ".to_string() + &"x".repeat(200);
        let preview = preview(&long_sql, 100);
        assert_eq!(preview.chars().count(), 101);
        assert!(preview.ends_with('…'));
    }
}
