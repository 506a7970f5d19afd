//! The three pure validation predicates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::PolicyViolation;
use crate::keywords::{self, BLOCKED_KEYWORDS};

static KEYWORD_SCAN: Lazy<Regex> = Lazy::new(|| {
    let alternation = BLOCKED_KEYWORDS.iter().copied().collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"\b({alternation})\b")).expect("keyword scan pattern is valid")
});

static TOKEN_SCAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("token scan pattern is valid"));

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Validate an incoming SQL statement against the keyword/prefix deny-lists
/// and the allowed-statement-type rule for the given mode.
///
/// Syntactic only: no SQL parsing. In read mode the first token must be
/// `SELECT` or `WITH`; in modification mode additionally `INSERT`, `UPDATE`,
/// `DELETE`.
pub fn validate_query(sql: &str, allow_modifications: bool) -> Result<(), PolicyViolation> {
    if sql.trim().is_empty() {
        return Err(PolicyViolation::EmptyInput);
    }

    let upper = sql.to_uppercase();

    if let Some(captures) = KEYWORD_SCAN.captures(&upper) {
        let keyword = captures.get(1).expect("group 1 always matches").as_str();
        return Err(PolicyViolation::BlockedKeyword(keyword.to_string()));
    }

    for token in TOKEN_SCAN.find_iter(&upper) {
        if keywords::starts_with_blocked_prefix(token.as_str()) {
            return Err(PolicyViolation::BlockedPrefix(token.as_str().to_string()));
        }
    }

    let first_token = upper
        .split_whitespace()
        .next()
        .expect("non-empty after the blank check above");

    let allowed: &[&str] = if allow_modifications {
        &["SELECT", "WITH", "INSERT", "UPDATE", "DELETE"]
    } else {
        &["SELECT", "WITH"]
    };

    if !allowed.contains(&first_token) {
        return Err(PolicyViolation::DisallowedStatementType(first_token.to_string()));
    }

    Ok(())
}

/// Validate a bare SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`, and not itself
/// a blocked keyword (case-insensitively).
pub fn validate_identifier(name: &str) -> Result<(), PolicyViolation> {
    if !IDENTIFIER.is_match(name) {
        return Err(PolicyViolation::InvalidIdentifier(name.to_string()));
    }
    if keywords::is_blocked_keyword(&name.to_uppercase()) {
        return Err(PolicyViolation::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// Validate a stored-procedure name: rejects names starting with a blocked
/// prefix (`xp_`, `sp_`), case-insensitively.
pub fn validate_procedure_name(name: &str) -> Result<(), PolicyViolation> {
    let upper = name.to_uppercase();
    if keywords::starts_with_blocked_prefix(&upper) {
        return Err(PolicyViolation::BlockedPrefix(name.to_string()));
    }
    Ok(())
}

/// Validate `schema` and `name` as identifiers and return the bracket-quoted
/// `[schema].[name]` form.
///
/// Identifiers must be validated before interpolation; this is the only
/// sanctioned path from a raw identifier string to SQL text.
pub fn sanitize_table_name(name: &str, schema: &str) -> Result<String, PolicyViolation> {
    validate_identifier(schema)?;
    validate_identifier(name)?;
    Ok(format!("[{schema}].[{name}]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_is_allowed_in_read_mode() {
        assert!(validate_query("SELECT * FROM Users", false).is_ok());
    }

    #[test]
    fn insert_is_rejected_in_read_mode() {
        let err = validate_query("INSERT INTO Users VALUES (1)", false).unwrap_err();
        assert_eq!(err, PolicyViolation::DisallowedStatementType("INSERT".to_string()));
    }

    #[test]
    fn insert_is_allowed_in_modification_mode() {
        assert!(validate_query("INSERT INTO Users VALUES (1)", true).is_ok());
    }

    #[test]
    fn drop_is_always_blocked() {
        let err = validate_query("DROP TABLE Users", true).unwrap_err();
        assert_eq!(err, PolicyViolation::BlockedKeyword("DROP".to_string()));
    }

    #[test]
    fn blocked_keyword_inside_a_select_is_still_caught() {
        let err = validate_query("SELECT * FROM Users; DROP TABLE Users", true).unwrap_err();
        assert_eq!(err, PolicyViolation::BlockedKeyword("DROP".to_string()));
    }

    #[test]
    fn system_stored_procedure_prefix_is_blocked() {
        let err = validate_query("SELECT xp_cmdshell('dir')", false).unwrap_err();
        assert_eq!(err, PolicyViolation::BlockedPrefix("XP_CMDSHELL".to_string()));
    }

    #[test]
    fn empty_query_is_rejected() {
        assert_eq!(validate_query("   ", false).unwrap_err(), PolicyViolation::EmptyInput);
    }

    #[test]
    fn valid_identifier_is_accepted() {
        assert!(validate_identifier("Users").is_ok());
        assert!(validate_identifier("_temp").is_ok());
    }

    #[test]
    fn identifier_matching_a_keyword_is_rejected() {
        assert!(validate_identifier("DROP").is_err());
    }

    #[test]
    fn identifier_with_invalid_characters_is_rejected() {
        assert!(validate_identifier("Users; --").is_err());
        assert!(validate_identifier("1Users").is_err());
    }

    #[test]
    fn procedure_name_with_system_prefix_is_rejected() {
        assert!(validate_procedure_name("sp_configure").is_err());
        assert!(validate_procedure_name("xp_cmdshell").is_err());
        assert!(validate_procedure_name("GetUsers").is_ok());
    }

    #[test]
    fn sanitize_table_name_brackets_both_parts() {
        assert_eq!(sanitize_table_name("Users", "dbo").unwrap(), "[dbo].[Users]");
    }

    #[test]
    fn sanitize_table_name_rejects_invalid_schema() {
        assert!(sanitize_table_name("Users", "dbo; DROP").is_err());
    }
}
