//! Client-level errors.
//!
//! These cover configuration parsing, identifier validation, and the
//! Azure SQL routing redirect loop. The wire-level failures a finished
//! TDS implementation would also report (protocol errors, TLS failures,
//! login rejection) belong to the driver's own boundary and are out of
//! scope here; see `crate::gateway_adapter` for how this client's narrow
//! `Result` is translated into the pool's driver-error boundary.

use thiserror::Error;

/// Errors produced by [`crate::Client`] and [`crate::Config`].
#[derive(Debug, Error)]
pub enum Error {
    /// A connection string or builder option could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An identifier (table, savepoint, parameter name) failed validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The server redirected the client (Azure SQL), but the redirect
    /// chain exceeded the maximum number of hops this client will follow.
    #[error("too many routing redirects (max {max})")]
    TooManyRedirects {
        /// The configured redirect limit that was exceeded.
        max: u8,
    },

    /// The server asked the client to reconnect to a different
    /// host/port (Azure SQL gateway redirect).
    #[error("server requested routing redirect to {host}:{port}")]
    Routing {
        /// The host to reconnect to.
        host: String,
        /// The port to reconnect to.
        port: u16,
    },
}

/// Convenience alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_redirect_reports_the_new_target() {
        let error = Error::Routing { host: "sql2.example.com".to_string(), port: 1434 };
        assert_eq!(error.to_string(), "server requested routing redirect to sql2.example.com:1434");
    }

    #[test]
    fn config_error_carries_its_own_message() {
        let error = Error::Config("invalid port: abc".to_string());
        assert_eq!(error.to_string(), "invalid configuration: invalid port: abc");
    }
}
