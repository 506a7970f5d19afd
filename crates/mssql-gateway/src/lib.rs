//! # mssql-gateway
//!
//! The request pipeline tying every other component together: SQL policy
//! validation, row-limiting rewrite, parameter binding, pooled execution,
//! structured auditing, TTL-cached introspection, and response shaping.
//!
//! [`Gateway`] is the single entry point; [`config::GatewayConfig`] builds
//! its per-database configuration from an environment-like source.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod audit;
pub mod config;
pub mod error;
mod gateway;
pub mod responses;

pub use error::GatewayError;
pub use gateway::Gateway;
pub use responses::to_json_response;
