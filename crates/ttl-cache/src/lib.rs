//! Expiration-driven key/value cache used to stabilize schema-introspection
//! latency, plus a deterministic memoisation key builder.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod cache;
mod key;

pub use cache::{Cache, CacheStats};
pub use key::memoize_key;
