//! Redaction pass: strips credentials, hosts, and IP literals from a
//! stringified driver error.

use once_cell::sync::Lazy;
use regex::Regex;

static LOGIN_FAILED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Login failed for user '[^']*'").expect("valid pattern"));

static SERVER_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SERVER=[^;,\s]+").expect("valid pattern"));

static UID_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)UID=[^;,\s]+").expect("valid pattern"));

static PWD_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)PWD=[^;,\s]+").expect("valid pattern"));

static IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:(?:25[0-5]|2[0-4]\d|1?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|1?\d?\d)\b")
        .expect("valid pattern")
});

/// Redact credentials, hosts, and IPv4 literals from `message`.
///
/// Applied before [`crate::simplify::simplify`]; never surfaces host, user,
/// password, or IP information to the caller.
#[must_use]
pub fn sanitize(message: &str) -> String {
    let message = LOGIN_FAILED.replace_all(message, "Login failed for user [REDACTED_USER]");
    let message = SERVER_FIELD.replace_all(&message, "SERVER=[REDACTED_SERVER]");
    let message = UID_FIELD.replace_all(&message, "UID=[REDACTED_USER]");
    let message = PWD_FIELD.replace_all(&message, "PWD=[REDACTED_PASSWORD]");
    IPV4.replace_all(&message, "[REDACTED_IP]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_login_failed_user() {
        let out = sanitize("Login failed for user 'sa'.");
        assert!(!out.contains("'sa'"));
        assert!(out.contains("[REDACTED_USER]"));
    }

    #[test]
    fn redacts_connection_string_fields() {
        let out = sanitize("SERVER=10.0.0.5;UID=sa;PWD=hunter2;");
        assert!(!out.contains("10.0.0.5"));
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("UID=sa"));
    }

    #[test]
    fn redacts_bare_ipv4() {
        let out = sanitize("could not connect to 192.168.1.10:1433");
        assert!(!out.contains("192.168.1.10"));
        assert!(out.contains("[REDACTED_IP]"));
    }

    #[test]
    fn leaves_unrelated_text_untouched() {
        assert_eq!(sanitize("Invalid object name 'Users'"), "Invalid object name 'Users'");
    }
}
