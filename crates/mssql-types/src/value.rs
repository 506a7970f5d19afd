//! The dynamic SQL value type shared by query parameters and result rows.

use std::fmt;

use serde::Serialize;

/// A single SQL Server value, in either direction (bound parameter or
/// projected column).
///
/// This is intentionally a flat, serializable enum rather than a typed
/// column system: the gateway materialises rows as `column_name -> value`
/// maps for its callers (an LLM agent, via JSON), so the wire-level
/// precision a full driver needs (collation, exact numeric scale, TDS type
/// tokens) lives in the driver layer, not here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,
    /// `BIT`.
    Bit(bool),
    /// `TINYINT`/`SMALLINT`/`INT`/`BIGINT`.
    Int(i64),
    /// `REAL`/`FLOAT`.
    Float(f64),
    /// `DECIMAL`/`NUMERIC`, carried as its canonical string form.
    Decimal(String),
    /// `CHAR`/`VARCHAR`/`NCHAR`/`NVARCHAR`/`TEXT`/`NTEXT`.
    Text(String),
    /// `BINARY`/`VARBINARY`/`IMAGE`.
    Binary(Vec<u8>),
    /// `DATETIME`/`DATETIME2`/`SMALLDATETIME`, carried as RFC 3339.
    #[cfg(feature = "chrono")]
    DateTime(chrono::NaiveDateTime),
}

impl SqlValue {
    /// `true` if this value is SQL `NULL`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bit(b) => write!(f, "{b}"),
            SqlValue::Int(i) => write!(f, "{i}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Decimal(d) => write!(f, "{d}"),
            SqlValue::Text(s) => write!(f, "{s}"),
            SqlValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
            #[cfg(feature = "chrono")]
            SqlValue::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bit(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_round_trips_to_json_null() {
        let json = serde_json::to_value(SqlValue::Null).expect("serialize");
        assert_eq!(json, serde_json::Value::Null);
    }

    #[test]
    fn text_serializes_as_plain_string() {
        let json = serde_json::to_value(SqlValue::Text("hi".into())).expect("serialize");
        assert_eq!(json, serde_json::json!("hi"));
    }

    #[test]
    fn option_conversion_maps_none_to_null() {
        let none: Option<i64> = None;
        assert_eq!(SqlValue::from(none), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(5i64)), SqlValue::Int(5));
    }
}
