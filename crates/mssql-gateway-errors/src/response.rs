//! The caller-facing error shape.

use serde::Serialize;

use crate::sanitize::sanitize;
use crate::simplify::simplify;

/// A caller-safe error response, ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Always `false`; present so callers can branch on one field.
    pub success: bool,
    /// The simplified, stable error message.
    pub error: String,
    /// Optional operation-level context (e.g. which alias or filename).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_context: Option<String>,
    /// Optional sanitized (but not simplified) detail, for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

/// Build an [`ErrorResponse`] from a raw driver/internal error string.
///
/// Runs [`sanitize`] then [`simplify`]; never surfaces host, user,
/// password, or IP information.
#[must_use]
pub fn create_error_response(error: &str, context: Option<&str>) -> ErrorResponse {
    let sanitized = sanitize(error);
    let simplified = simplify(&sanitized);
    ErrorResponse {
        success: false,
        error: simplified,
        error_context: context.map(str::to_string),
        error_detail: Some(sanitized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_never_contains_password() {
        let response = create_error_response("Login failed for user 'sa'. PWD=hunter2;", Some("connect"));
        assert!(!response.error.contains("hunter2"));
        assert!(!response.error_detail.as_ref().unwrap().contains("hunter2"));
        assert!(!response.success);
    }

    #[test]
    fn context_is_preserved_verbatim() {
        let response = create_error_response("Invalid object name 'Ghost'.", Some("list_tables"));
        assert_eq!(response.error_context.as_deref(), Some("list_tables"));
        assert_eq!(response.error, "Object not found: Ghost");
    }
}
