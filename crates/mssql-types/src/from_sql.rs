//! Conversion from a [`SqlValue`] back into a Rust value.

use crate::{SqlValue, TypeError};

/// Types that a column's [`SqlValue`] can be converted into.
pub trait FromSql: Sized {
    /// Convert a (non-nullable) value.
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError>;

    /// Convert a value, treating `NULL` as `Ok(None)` rather than an error.
    fn from_sql_nullable(value: &SqlValue) -> Result<Option<Self>, TypeError> {
        if value.is_null() {
            Ok(None)
        } else {
            Self::from_sql(value).map(Some)
        }
    }
}

impl FromSql for SqlValue {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        Ok(value.clone())
    }
}

impl FromSql for String {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Text(s) => Ok(s.clone()),
            SqlValue::Null => Err(TypeError::UnexpectedNull),
            other => Err(TypeError::TypeMismatch {
                expected: "Text",
                actual: other.to_string(),
            }),
        }
    }
}

impl FromSql for i64 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Int(i) => Ok(*i),
            SqlValue::Null => Err(TypeError::UnexpectedNull),
            other => Err(TypeError::TypeMismatch {
                expected: "Int",
                actual: other.to_string(),
            }),
        }
    }
}

impl FromSql for bool {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Bit(b) => Ok(*b),
            SqlValue::Null => Err(TypeError::UnexpectedNull),
            other => Err(TypeError::TypeMismatch {
                expected: "Bit",
                actual: other.to_string(),
            }),
        }
    }
}

impl FromSql for f64 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Float(f) => Ok(*f),
            SqlValue::Null => Err(TypeError::UnexpectedNull),
            other => Err(TypeError::TypeMismatch {
                expected: "Float",
                actual: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_to_non_nullable_is_an_error() {
        assert_eq!(String::from_sql(&SqlValue::Null), Err(TypeError::UnexpectedNull));
    }

    #[test]
    fn null_to_nullable_is_none() {
        assert_eq!(String::from_sql_nullable(&SqlValue::Null), Ok(None));
    }

    #[test]
    fn mismatched_variant_is_an_error() {
        assert!(i64::from_sql(&SqlValue::Text("x".into())).is_err());
    }
}
