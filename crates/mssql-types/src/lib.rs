//! # mssql-types
//!
//! SQL Server to Rust type mappings and conversions.
//!
//! This crate defines [`SqlValue`], the dynamic value type the gateway
//! binds as query parameters and projects result columns into, along with
//! the [`ToSql`]/[`FromSql`] conversion traits. It deliberately stops short
//! of a full TDS type system (collations, exact numeric precision, table-
//! valued parameters): those live behind the driver's own boundary.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod error;
mod from_sql;
mod to_sql;
mod value;

pub use error::TypeError;
pub use from_sql::FromSql;
pub use to_sql::ToSql;
pub use value::SqlValue;
