//! Integration tests for `Pool::acquire`/`release` against a mock connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mssql_driver_pool::{Connection, ConnectionFactory, Pool, PoolConfig, PoolError};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("mock connection error")]
struct MockError;

struct MockConnection {
    healthy: bool,
    reset_calls: Arc<AtomicU32>,
}

#[async_trait]
impl Connection for MockConnection {
    type Error = MockError;

    async fn health_check(&mut self, _query: &str) -> Result<(), Self::Error> {
        if self.healthy { Ok(()) } else { Err(MockError) }
    }

    async fn reset(&mut self) -> Result<(), Self::Error> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockFactory {
    created: AtomicUsize,
    reset_calls: Arc<AtomicU32>,
}

impl MockFactory {
    fn new() -> Self {
        Self { created: AtomicUsize::new(0), reset_calls: Arc::new(AtomicU32::new(0)) }
    }
}

#[async_trait]
impl ConnectionFactory for MockFactory {
    type Connection = MockConnection;

    async fn connect(&self) -> Result<Self::Connection, MockError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection { healthy: true, reset_calls: self.reset_calls.clone() })
    }
}

#[tokio::test]
async fn acquire_then_release_reparks_connection() {
    let factory = MockFactory::new();
    let pool = Pool::new(factory, PoolConfig::new().min_size(1).max_size(2))
        .await
        .expect("pool creation");

    let conn = pool.acquire().await.expect("acquire");
    assert_eq!(pool.metrics().in_use, 1);
    conn.release().await;

    assert_eq!(pool.metrics().in_use, 0);
    assert_eq!(pool.metrics().available, 1);
    assert_eq!(pool.metrics().transaction_resets, 1);
}

#[tokio::test]
async fn acquire_grows_pool_up_to_max_size() {
    let factory = MockFactory::new();
    let pool = Pool::new(factory, PoolConfig::new().min_size(0).max_size(2))
        .await
        .expect("pool creation");

    let a = pool.acquire().await.expect("first acquire");
    let b = pool.acquire().await.expect("second acquire");
    assert_eq!(pool.metrics().total_connections, 2);

    drop(a);
    drop(b);
}

#[tokio::test]
async fn acquire_times_out_when_pool_exhausted() {
    let factory = MockFactory::new();
    let pool = Pool::new(
        factory,
        PoolConfig::new().min_size(1).max_size(1).acquire_timeout(Duration::from_millis(200)),
    )
    .await
    .expect("pool creation");

    let _held = pool.acquire().await.expect("acquire");
    let result = pool.acquire().await;
    assert!(matches!(result, Err(PoolError::AcquireTimeout { .. })));
}

#[tokio::test]
async fn close_rejects_further_acquires() {
    let factory = MockFactory::new();
    let pool = Pool::new(factory, PoolConfig::new().min_size(1).max_size(1))
        .await
        .expect("pool creation");

    pool.close().await;
    assert!(pool.is_closed());

    let result = pool.acquire().await;
    assert!(matches!(result, Err(PoolError::PoolClosed)));
}

#[tokio::test]
async fn detach_removes_connection_without_reparking() {
    let factory = MockFactory::new();
    let pool = Pool::new(factory, PoolConfig::new().min_size(1).max_size(1))
        .await
        .expect("pool creation");

    let conn = pool.acquire().await.expect("acquire");
    let _raw = conn.detach();

    assert_eq!(pool.metrics().total_connections, 0);
    assert_eq!(pool.metrics().available, 0);
}
