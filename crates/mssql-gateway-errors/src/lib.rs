//! Maps driver errors and internal failures to a sanitized, caller-safe
//! representation.
//!
//! Two ordered, pure passes: [`sanitize`] redacts credentials/hosts/IPs,
//! [`simplify`] rewrites common driver phrasings to short, stable forms.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod response;
mod sanitize;
mod simplify;

pub use response::{ErrorResponse, create_error_response};
pub use sanitize::sanitize;
pub use simplify::simplify;
