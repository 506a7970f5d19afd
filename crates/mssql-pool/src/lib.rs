//! # mssql-driver-pool
//!
//! Purpose-built connection pool for SQL Server with lifecycle management.
//!
//! Generic over a [`connection::Connection`] / [`connection::ConnectionFactory`]
//! pair rather than any concrete driver, so this crate carries no TDS wire
//! dependency: it knows how to age out, health-check, and reset connections,
//! not how to speak to SQL Server.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mssql_driver_pool::{Pool, PoolConfig};
//! use std::time::Duration;
//!
//! let config = PoolConfig::new()
//!     .min_size(5)
//!     .max_size(20)
//!     .idle_timeout(Duration::from_secs(300));
//!
//! let pool = Pool::new(my_factory, config).await?;
//!
//! let conn = pool.acquire().await?;
//! // Use `conn` (it derefs to the pooled `Connection`)...
//! conn.release().await;
//!
//! let status = pool.status();
//! println!("utilization: {:.1}%", status.utilization());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod error;
pub mod lifecycle;
pub mod pool;

pub use config::{DEFAULT_HEALTH_CHECK_QUERY, PoolConfig};
pub use connection::{Connection, ConnectionFactory};
pub use error::PoolError;
pub use lifecycle::ConnectionMetadata;
pub use pool::{Pool, PoolMetrics, PoolStatus, PooledConnection};
