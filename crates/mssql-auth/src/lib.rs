//! # mssql-auth
//!
//! Authentication credentials for SQL Server connections.
//!
//! The gateway only ever authenticates with a SQL Server login (username
//! and password) supplied through the registry's per-database
//! configuration; this crate carries just that one credential shape.
//! A full driver would also offer Windows-integrated (SSPI), Azure AD, and
//! certificate-based authentication, but those are driver-internal
//! concerns the gateway never constructs directly.

#![warn(missing_docs)]
#![deny(unsafe_code)]

/// Authentication credentials presented during login.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A SQL Server login (as opposed to Windows-integrated auth).
    SqlServer {
        /// Login username.
        username: String,
        /// Login password.
        password: String,
    },
}

impl Credentials {
    /// Build SQL Server login credentials.
    pub fn sql_server(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::SqlServer {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The username, regardless of credential kind.
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::SqlServer { username, .. } => username,
        }
    }
}

impl std::fmt::Debug for Credentials {
    /// Never prints the password; only the username.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials::SqlServer")
            .field("username", &self.username())
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_includes_the_password() {
        let creds = Credentials::sql_server("sa", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("sa"));
    }
}
