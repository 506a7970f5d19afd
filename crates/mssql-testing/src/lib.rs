//! Shared test doubles for the gateway crates.
//!
//! [`MockConnection`]/[`MockConnectionFactory`] implement
//! [`mssql_driver_pool::Connection`]/[`mssql_driver_pool::ConnectionFactory`]
//! and [`mssql_handle::SqlConnection`] so every other crate in this
//! workspace can unit-test pool/handle/gateway logic deterministically,
//! without a live SQL Server.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod mock;

pub use mock::{CallLog, MockConnection, MockConnectionFactory, MockError, MockScript};
