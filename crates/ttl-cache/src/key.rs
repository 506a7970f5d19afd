//! Deterministic memoisation keys.

/// Build a cache key as `prefix ":" arg1 ":" arg2 ":" … ":" k1=v1 ":" k2=v2 …`,
/// with `kwargs` sorted by name so the key is independent of call-site
/// keyword-argument order.
///
/// Callers memoising a per-database operation must include the database
/// alias among `kwargs` (conventionally under the key `"database"`) so
/// cached answers are never shared across databases.
#[must_use]
pub fn memoize_key(prefix: &str, args: &[&str], kwargs: &[(&str, &str)]) -> String {
    let mut sorted_kwargs: Vec<_> = kwargs.to_vec();
    sorted_kwargs.sort_by_key(|(name, _)| *name);

    let mut parts = vec![prefix.to_string()];
    parts.extend(args.iter().map(|arg| (*arg).to_string()));
    parts.extend(sorted_kwargs.iter().map(|(name, value)| format!("{name}={value}")));
    parts.join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_independent_of_kwarg_order() {
        let a = memoize_key("list_tables", &[], &[("database", "a"), ("schema", "dbo")]);
        let b = memoize_key("list_tables", &[], &[("schema", "dbo"), ("database", "a")]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_databases_produce_different_keys() {
        let a = memoize_key("list_tables", &[], &[("database", "a")]);
        let b = memoize_key("list_tables", &[], &[("database", "b")]);
        assert_ne!(a, b);
    }

    #[test]
    fn positional_args_are_included_in_order() {
        let key = memoize_key("describe_table", &["Users"], &[("database", "a")]);
        assert_eq!(key, "describe_table:Users:database=a");
    }
}
