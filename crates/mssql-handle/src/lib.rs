//! Thin façade around one connection pool.
//!
//! [`Handle`] exposes `query`/`exec`/`cursor`/`close` over a generic
//! [`mssql_driver_pool::Pool`], programming only against [`SqlConnection`]
//! so it carries no dependency on a concrete SQL Server driver.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod connection;
mod error;
mod handle;

pub use connection::{QueryResult, SqlConnection};
pub use error::HandleError;
pub use handle::Handle;
