//! Simplification pass: rewrites common driver phrasings to short, stable
//! forms.

use once_cell::sync::Lazy;
use regex::Regex;

struct Rewrite {
    pattern: Lazy<Regex>,
    replace: fn(&regex::Captures<'_>) -> String,
}

static INVALID_OBJECT: Rewrite = Rewrite {
    pattern: Lazy::new(|| Regex::new(r"(?i)Invalid object name '([^']*)'").expect("valid pattern")),
    replace: |captures| format!("Object not found: {}", &captures[1]),
};

static INVALID_COLUMN: Rewrite = Rewrite {
    pattern: Lazy::new(|| Regex::new(r"(?i)Invalid column name '([^']*)'").expect("valid pattern")),
    replace: |captures| format!("Column not found: {}", &captures[1]),
};

static PROCEDURE_NOT_FOUND: Rewrite = Rewrite {
    pattern: Lazy::new(|| {
        Regex::new(r"(?i)Could not find stored procedure '([^']*)'").expect("valid pattern")
    }),
    replace: |captures| format!("Procedure not found: {}", &captures[1]),
};

static UNBOUND_IDENTIFIER: Rewrite = Rewrite {
    pattern: Lazy::new(|| {
        Regex::new(r#"(?i)The multi-part identifier "([^"]*)" could not be bound"#)
            .expect("valid pattern")
    }),
    replace: |captures| format!("Invalid identifier: {}", &captures[1]),
};

static ARITHMETIC_OVERFLOW: Rewrite = Rewrite {
    pattern: Lazy::new(|| Regex::new(r"(?i)Arithmetic overflow error").expect("valid pattern")),
    replace: |_| "Numeric overflow error".to_string(),
};

static DATA_TRUNCATED: Rewrite = Rewrite {
    pattern: Lazy::new(|| {
        Regex::new(r"(?i)String or binary data would be truncated").expect("valid pattern")
    }),
    replace: |_| "Data too large for column".to_string(),
};

static PRIMARY_KEY_VIOLATION: Rewrite = Rewrite {
    pattern: Lazy::new(|| {
        Regex::new(r"(?i)Violation of PRIMARY KEY constraint").expect("valid pattern")
    }),
    replace: |_| "Duplicate primary key".to_string(),
};

static UNIQUE_KEY_VIOLATION: Rewrite = Rewrite {
    pattern: Lazy::new(|| {
        Regex::new(r"(?i)Violation of UNIQUE KEY constraint").expect("valid pattern")
    }),
    replace: |_| "Duplicate unique value".to_string(),
};

static FOREIGN_KEY_VIOLATION: Rewrite = Rewrite {
    pattern: Lazy::new(|| {
        Regex::new(r"(?i)The INSERT statement conflicted with the FOREIGN KEY constraint")
            .expect("valid pattern")
    }),
    replace: |_| "Foreign key constraint violation".to_string(),
};

static REFERENCE_VIOLATION: Rewrite = Rewrite {
    pattern: Lazy::new(|| {
        Regex::new(r"(?i)The DELETE statement conflicted with the REFERENCE constraint")
            .expect("valid pattern")
    }),
    replace: |_| "Cannot delete - referenced by other records".to_string(),
};

static TIMEOUT_EXPIRED: Rewrite = Rewrite {
    pattern: Lazy::new(|| Regex::new(r"(?i)Timeout expired").expect("valid pattern")),
    replace: |_| "Query timed out".to_string(),
};

static LOGIN_FAILED: Rewrite = Rewrite {
    pattern: Lazy::new(|| Regex::new(r"(?i)Login failed").expect("valid pattern")),
    replace: |_| "Authentication failed".to_string(),
};

static DEADLOCK: Rewrite = Rewrite {
    pattern: Lazy::new(|| Regex::new(r"(?i)deadlock").expect("valid pattern")),
    replace: |_| "Transaction was deadlocked and rolled back".to_string(),
};

static CANNOT_INSERT_NULL: Rewrite = Rewrite {
    pattern: Lazy::new(|| {
        Regex::new(r"(?i)Cannot insert the value NULL into column '([^']*)'").expect("valid pattern")
    }),
    replace: |captures| format!("Required field is missing: {}", &captures[1]),
};

fn rewrites() -> [&'static Rewrite; 14] {
    [
        &INVALID_OBJECT,
        &INVALID_COLUMN,
        &PROCEDURE_NOT_FOUND,
        &UNBOUND_IDENTIFIER,
        &ARITHMETIC_OVERFLOW,
        &DATA_TRUNCATED,
        &PRIMARY_KEY_VIOLATION,
        &UNIQUE_KEY_VIOLATION,
        &FOREIGN_KEY_VIOLATION,
        &REFERENCE_VIOLATION,
        &TIMEOUT_EXPIRED,
        &LOGIN_FAILED,
        &DEADLOCK,
        &CANNOT_INSERT_NULL,
    ]
}

/// Rewrite `message` (already [`sanitize`](crate::sanitize::sanitize)d) to a
/// short, stable phrasing if it matches a known driver message; otherwise
/// returns it unchanged.
#[must_use]
pub fn simplify(message: &str) -> String {
    for rewrite in rewrites() {
        if let Some(captures) = rewrite.pattern.captures(message) {
            return (rewrite.replace)(&captures);
        }
    }
    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_invalid_object_name() {
        assert_eq!(simplify("Invalid object name 'Users'."), "Object not found: Users");
    }

    #[test]
    fn rewrites_timeout() {
        assert_eq!(simplify("Timeout expired."), "Query timed out");
    }

    #[test]
    fn rewrites_procedure_not_found() {
        assert_eq!(
            simplify("Could not find stored procedure 'GetUser'."),
            "Procedure not found: GetUser"
        );
    }

    #[test]
    fn rewrites_unbound_identifier() {
        assert_eq!(
            simplify(r#"The multi-part identifier "u.name" could not be bound."#),
            "Invalid identifier: u.name"
        );
    }

    #[test]
    fn rewrites_constraint_violations() {
        assert_eq!(simplify("Arithmetic overflow error converting IDENTITY to int."), "Numeric overflow error");
        assert_eq!(
            simplify("String or binary data would be truncated in table 'Users', column 'Name'."),
            "Data too large for column"
        );
        assert_eq!(
            simplify("Violation of PRIMARY KEY constraint 'PK_Users'. Cannot insert duplicate key."),
            "Duplicate primary key"
        );
        assert_eq!(
            simplify("Violation of UNIQUE KEY constraint 'UQ_Users_Email'. Cannot insert duplicate key."),
            "Duplicate unique value"
        );
        assert_eq!(
            simplify("The INSERT statement conflicted with the FOREIGN KEY constraint \"FK_Orders_Users\"."),
            "Foreign key constraint violation"
        );
        assert_eq!(
            simplify("The DELETE statement conflicted with the REFERENCE constraint \"FK_Orders_Users\"."),
            "Cannot delete - referenced by other records"
        );
    }

    #[test]
    fn leaves_unknown_messages_untouched() {
        assert_eq!(simplify("Some unrecognized driver failure"), "Some unrecognized driver failure");
    }
}
