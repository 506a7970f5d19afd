//! Connection pool implementation.
//!
//! A purpose-built connection pool with SQL Server-style lifecycle
//! management: stale/idle retirement, periodic health checks, and a
//! transaction-reset on every return to the parked queue.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::config::PoolConfig;
use crate::connection::{Connection, ConnectionFactory};
use crate::error::PoolError;
use crate::lifecycle::ConnectionMetadata;

type Err<F> = <<F as ConnectionFactory>::Connection as Connection>::Error;

struct Parked<C> {
    conn: C,
    metadata: ConnectionMetadata,
}

#[derive(Default)]
struct Counters {
    created_count: u32,
    checked_out: u32,
    total_acquisitions: u64,
    total_releases: u64,
    failed_acquisitions: u64,
    health_checks: u64,
    transaction_resets: u64,
    peak_usage: u32,
}

struct Inner<C> {
    parked: Mutex<VecDeque<Parked<C>>>,
    notify: Notify,
    counters: Mutex<Counters>,
    closed: AtomicBool,
    next_id: AtomicU64,
}

impl<C> Inner<C> {
    fn retire(&self, _parked: Parked<C>) {
        let mut counters = self.counters.lock();
        counters.created_count = counters.created_count.saturating_sub(1);
        // `_parked` drops here, closing the underlying connection.
    }
}

/// A connection pool over a generic [`ConnectionFactory`].
pub struct Pool<F: ConnectionFactory> {
    factory: F,
    config: PoolConfig,
    inner: Arc<Inner<F::Connection>>,
}

impl<F: ConnectionFactory> Pool<F> {
    /// Create a new pool, eagerly establishing `min_size` connections.
    ///
    /// Failures creating the initial connections are logged and ignored;
    /// remaining creations are attempted on demand by `acquire()`.
    pub async fn new(factory: F, config: PoolConfig) -> Result<Self, PoolError<Err<F>>> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let inner = Arc::new(Inner {
            parked: Mutex::new(VecDeque::with_capacity(config.max_size as usize)),
            notify: Notify::new(),
            counters: Mutex::new(Counters::default()),
            closed: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        });

        for _ in 0..config.min_size {
            match factory.connect().await {
                Ok(conn) => {
                    let id = inner.next_id.fetch_add(1, Ordering::Relaxed);
                    inner
                        .parked
                        .lock()
                        .push_back(Parked { conn, metadata: ConnectionMetadata::new(id) });
                    inner.counters.lock().created_count += 1;
                }
                Err(error) => {
                    tracing::warn!(%error, "failed to eagerly create pooled connection");
                }
            }
        }

        tracing::info!(
            min = config.min_size,
            max = config.max_size,
            "connection pool created"
        );

        Ok(Self { factory, config, inner })
    }

    /// Acquire a connection, per spec.md §4.3's acquire algorithm.
    pub async fn acquire(&self) -> Result<PooledConnection<F>, PoolError<Err<F>>> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(PoolError::PoolClosed);
        }

        let start = Instant::now();
        let deadline = start + self.config.acquire_timeout;

        loop {
            if Instant::now() >= deadline {
                self.inner.counters.lock().failed_acquisitions += 1;
                return Err(PoolError::AcquireTimeout {
                    waited_ms: start.elapsed().as_millis() as u64,
                });
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            let wait = remaining.min(Duration::from_millis(100));

            if let Some(mut parked) = self.try_take_parked(wait).await {
                if parked.metadata.is_stale(self.config.max_lifetime) {
                    self.inner.retire(parked);
                    continue;
                }
                if parked.metadata.is_idle_expired(self.config.idle_timeout) {
                    self.inner.retire(parked);
                    continue;
                }
                if parked
                    .metadata
                    .is_health_check_due(self.config.health_check_interval)
                {
                    match self.health_check(&mut parked.conn).await {
                        Ok(()) => {
                            self.inner.counters.lock().health_checks += 1;
                            parked.metadata.mark_health_checked();
                        }
                        Err(error) => {
                            tracing::warn!(%error, "pooled connection failed health check");
                            self.inner.retire(parked);
                            continue;
                        }
                    }
                }

                parked.metadata.mark_used();
                self.record_checkout();
                return Ok(PooledConnection::new(parked, self.inner.clone(), self.config.clone()));
            }

            // Dequeue attempt timed out; try growing the pool if there's room.
            let under_capacity = {
                let counters = self.inner.counters.lock();
                counters.created_count < self.config.max_size
            };
            if under_capacity {
                match self.factory.connect().await {
                    Ok(conn) => {
                        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                        self.inner.counters.lock().created_count += 1;
                        let mut metadata = ConnectionMetadata::new(id);
                        metadata.mark_used();
                        self.record_checkout();
                        return Ok(PooledConnection::new(
                            Parked { conn, metadata },
                            self.inner.clone(),
                            self.config.clone(),
                        ));
                    }
                    Err(error) => {
                        tracing::debug!(%error, "on-demand connection creation failed, retrying");
                    }
                }
            }
        }
    }

    async fn health_check(&self, conn: &mut F::Connection) -> Result<(), Err<F>> {
        conn.health_check(&self.config.health_check_query).await?;
        conn.reset().await
    }

    fn record_checkout(&self) {
        let mut counters = self.inner.counters.lock();
        counters.total_acquisitions += 1;
        counters.checked_out += 1;
        counters.peak_usage = counters.peak_usage.max(counters.checked_out);
    }

    /// Try once to pop a parked entry, waiting up to `wait` if the queue is
    /// momentarily empty. Returns `None` if still empty after the wait.
    async fn try_take_parked(&self, wait: Duration) -> Option<Parked<F::Connection>> {
        if let Some(parked) = self.inner.parked.lock().pop_front() {
            return Some(parked);
        }
        let _ = tokio::time::timeout(wait, self.inner.notify.notified()).await;
        self.inner.parked.lock().pop_front()
    }

    /// Close the pool: subsequent `acquire()` calls fail, and every parked
    /// connection is retired. Connections currently checked out are
    /// retired as they are released.
    pub async fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        let drained: Vec<_> = self.inner.parked.lock().drain(..).collect();
        for parked in drained {
            self.inner.retire(parked);
        }
        tracing::info!("connection pool closed");
    }

    /// `true` once [`Pool::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// The pool's configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// A point-in-time metrics snapshot.
    #[must_use]
    pub fn metrics(&self) -> PoolMetrics {
        let counters = self.inner.counters.lock();
        let available = self.inner.parked.lock().len() as u32;
        PoolMetrics {
            total_connections: counters.created_count,
            available,
            in_use: counters.checked_out,
            peak_usage: counters.peak_usage,
            total_acquisitions: counters.total_acquisitions,
            total_releases: counters.total_releases,
            failed_acquisitions: counters.failed_acquisitions,
            health_checks: counters.health_checks,
            transaction_resets: counters.transaction_resets,
            min_size: self.config.min_size,
            max_size: self.config.max_size,
            closed: self.inner.closed.load(Ordering::Acquire),
        }
    }

    /// A lighter-weight status view, handy for quick capacity checks.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let metrics = self.metrics();
        PoolStatus {
            available: metrics.available,
            in_use: metrics.in_use,
            total: metrics.total_connections,
            max: metrics.max_size,
        }
    }
}

/// Point-in-time pool metrics. See spec.md §4.3's "Metrics snapshot".
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct PoolMetrics {
    /// Live connections, parked or checked out.
    pub total_connections: u32,
    /// Parked (idle, available) connections.
    pub available: u32,
    /// Connections currently checked out.
    pub in_use: u32,
    /// Highest `in_use` has ever reached.
    pub peak_usage: u32,
    /// Total successful acquisitions.
    pub total_acquisitions: u64,
    /// Total releases (successful or not).
    pub total_releases: u64,
    /// Total acquisitions that failed (timeout).
    pub failed_acquisitions: u64,
    /// Total health checks performed.
    pub health_checks: u64,
    /// Total transaction resets performed on release.
    pub transaction_resets: u64,
    /// Configured minimum pool size.
    pub min_size: u32,
    /// Configured maximum pool size.
    pub max_size: u32,
    /// Whether the pool has been closed.
    pub closed: bool,
}

/// A compact view of pool capacity, derived from [`PoolMetrics`].
#[derive(Debug, Clone, Copy)]
pub struct PoolStatus {
    /// Number of idle connections available.
    pub available: u32,
    /// Number of connections currently in use.
    pub in_use: u32,
    /// Total number of live connections.
    pub total: u32,
    /// Maximum allowed connections.
    pub max: u32,
}

impl PoolStatus {
    /// Utilization as a percentage of `max`.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        (f64::from(self.in_use) / f64::from(self.max)) * 100.0
    }

    /// `true` if the pool has reached `max` live connections.
    #[must_use]
    pub fn is_at_capacity(&self) -> bool {
        self.total >= self.max
    }
}

/// A connection checked out from the pool.
///
/// Call [`release`](PooledConnection::release) to return it deterministically;
/// if the guard is simply dropped (an early return, a panic unwinding past
/// it), a best-effort release is spawned on the current Tokio runtime so the
/// connection is not permanently lost. See spec.md §4.3's "Scoped borrow".
pub struct PooledConnection<F: ConnectionFactory> {
    parked: Option<Parked<F::Connection>>,
    inner: Arc<Inner<F::Connection>>,
    config: PoolConfig,
}

impl<F: ConnectionFactory> PooledConnection<F> {
    fn new(parked: Parked<F::Connection>, inner: Arc<Inner<F::Connection>>, config: PoolConfig) -> Self {
        Self { parked: Some(parked), inner, config }
    }

    /// Metadata for this checkout.
    #[must_use]
    pub fn metadata(&self) -> &ConnectionMetadata {
        &self.parked.as_ref().expect("connection present until released").metadata
    }

    /// Explicitly return the connection to its pool: resets transaction
    /// state and either re-parks or retires it.
    pub async fn release(mut self) {
        if let Some(parked) = self.parked.take() {
            let handle = ReleaseHandle { inner: self.inner.clone(), config: self.config.clone() };
            handle.release(parked).await;
        }
    }

    /// Remove this connection from the pool permanently without closing
    /// it: it will not be re-parked or counted against `created_count`.
    pub fn detach(mut self) -> F::Connection {
        let parked = self.parked.take().expect("connection present until released");
        let mut counters = self.inner.counters.lock();
        counters.created_count = counters.created_count.saturating_sub(1);
        counters.checked_out = counters.checked_out.saturating_sub(1);
        parked.conn
    }
}

impl<F: ConnectionFactory> std::ops::Deref for PooledConnection<F> {
    type Target = F::Connection;

    fn deref(&self) -> &Self::Target {
        &self.parked.as_ref().expect("connection present until released").conn
    }
}

impl<F: ConnectionFactory> std::ops::DerefMut for PooledConnection<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.parked.as_mut().expect("connection present until released").conn
    }
}

/// A cheap, `Pool`-independent handle used to replay the release algorithm
/// from `Drop`, where we only have `Arc<Inner<C>>` and a cloned config, not
/// a borrow of the original `Pool<F>`.
struct ReleaseHandle<C> {
    inner: Arc<Inner<C>>,
    config: PoolConfig,
}

impl<C: Connection> ReleaseHandle<C> {
    async fn release(&self, mut parked: Parked<C>) {
        {
            let mut counters = self.inner.counters.lock();
            counters.total_releases += 1;
            counters.checked_out = counters.checked_out.saturating_sub(1);
        }

        if self.inner.closed.load(Ordering::Acquire) || parked.metadata.is_stale(self.config.max_lifetime) {
            self.inner.retire(parked);
            return;
        }

        match parked.conn.reset().await {
            Ok(()) => {
                self.inner.counters.lock().transaction_resets += 1;
                self.inner.parked.lock().push_back(parked);
                self.inner.notify.notify_one();
            }
            Err(error) => {
                tracing::warn!(%error, "failed to reset connection on release; retiring");
                self.inner.retire(parked);
            }
        }
    }
}

impl<F: ConnectionFactory> Drop for PooledConnection<F> {
    fn drop(&mut self) {
        let Some(parked) = self.parked.take() else {
            return;
        };
        let handle = ReleaseHandle { inner: self.inner.clone(), config: self.config.clone() };
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move { handle.release(parked).await });
        } else {
            tracing::warn!("pooled connection dropped outside a Tokio runtime; discarding without reset");
            let mut counters = handle.inner.counters.lock();
            counters.created_count = counters.created_count.saturating_sub(1);
            counters.checked_out = counters.checked_out.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_status_utilization() {
        let status = PoolStatus { available: 5, in_use: 5, total: 10, max: 20 };
        assert!((status.utilization() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pool_status_at_capacity() {
        let at_cap = PoolStatus { available: 0, in_use: 10, total: 10, max: 10 };
        assert!(at_cap.is_at_capacity());

        let not_at_cap = PoolStatus { available: 5, in_use: 5, total: 10, max: 20 };
        assert!(!not_at_cap.is_at_capacity());
    }

    #[test]
    fn pool_status_zero_max_has_zero_utilization() {
        let status = PoolStatus { available: 0, in_use: 0, total: 0, max: 0 };
        assert!((status.utilization() - 0.0).abs() < f64::EPSILON);
    }
}
