//! Static keyword and prefix deny-lists.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Statement keywords that are always rejected, regardless of mode.
pub static BLOCKED_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "DROP",
        "TRUNCATE",
        "ALTER",
        "CREATE",
        "GRANT",
        "REVOKE",
        "SHUTDOWN",
        "BACKUP",
        "RESTORE",
        "DBCC",
        "OPENROWSET",
        "OPENQUERY",
        "OPENDATASOURCE",
        "BULK",
        "KILL",
    ]
    .into_iter()
    .collect()
});

/// Identifier/token prefixes that are always rejected, case-insensitively.
pub static BLOCKED_PREFIXES: Lazy<[&'static str; 2]> = Lazy::new(|| ["XP_", "SP_"]);

/// `true` if `upper_word` (already upper-cased) is a blocked keyword.
#[must_use]
pub fn is_blocked_keyword(upper_word: &str) -> bool {
    BLOCKED_KEYWORDS.contains(upper_word)
}

/// `true` if `upper_token` (already upper-cased) starts with a blocked prefix.
#[must_use]
pub fn starts_with_blocked_prefix(upper_token: &str) -> bool {
    BLOCKED_PREFIXES.iter().any(|prefix| upper_token.starts_with(prefix))
}
