//! Syntactic SQL validation policy.
//!
//! This is a denial layer, not a language-level guarantee: it is not a SQL
//! parser and performs no semantic analysis. Every statement actually
//! executed must still be parameter-bound by the driver; identifiers that
//! must be interpolated go through [`sanitize_table_name`] only after
//! validation.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod error;
mod keywords;
mod policy;

pub use error::PolicyViolation;
pub use keywords::{BLOCKED_KEYWORDS, BLOCKED_PREFIXES};
pub use policy::{sanitize_table_name, validate_identifier, validate_procedure_name, validate_query};
