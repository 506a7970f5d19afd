//! The database handle: one pool, wrapped with a query/exec/cursor surface.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mssql_driver_pool::{ConnectionFactory, Pool};
use mssql_types::SqlValue;

use crate::connection::{QueryResult, SqlConnection};
use crate::error::HandleError;

type Err<F> = <<F as ConnectionFactory>::Connection as mssql_driver_pool::Connection>::Error;

/// A thin façade around one [`Pool`]: `query`, `exec`, and scoped `cursor`
/// operations, with rollback-on-error and release-on-exit.
///
/// Driver errors propagate unchanged; the handle never retries. Rollback
/// failures encountered while unwinding an error are logged and swallowed
/// so the original error always surfaces.
pub struct Handle<F: ConnectionFactory>
where
    F::Connection: SqlConnection,
{
    pool: Arc<Pool<F>>,
    closed: AtomicBool,
}

impl<F: ConnectionFactory> Handle<F>
where
    F::Connection: SqlConnection,
{
    /// Wrap an already-constructed pool.
    #[must_use]
    pub fn new(pool: Arc<Pool<F>>) -> Self {
        Self { pool, closed: AtomicBool::new(false) }
    }

    fn ensure_open(&self) -> Result<(), HandleError<Err<F>>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(HandleError::Closed);
        }
        Ok(())
    }

    /// Execute a read query and materialise every row.
    pub async fn query(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<QueryResult, HandleError<Err<F>>> {
        self.ensure_open()?;
        let mut conn = self.pool.acquire().await?;
        let result = conn.query(sql, params).await;
        conn.release().await;
        result.map_err(HandleError::Driver)
    }

    /// Execute a statement, committing on success and rolling back on
    /// failure (the rollback failure, if any, is logged and swallowed so
    /// the original error re-raises unchanged).
    pub async fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<u64, HandleError<Err<F>>> {
        self.ensure_open()?;
        let mut conn = self.pool.acquire().await?;

        let outcome = match conn.execute(sql, params).await {
            Ok(affected) => match conn.commit().await {
                Ok(()) => Ok(affected),
                Err(commit_error) => {
                    if let Err(rollback_error) = conn.rollback().await {
                        tracing::warn!(error = %rollback_error, "rollback after failed commit also failed");
                    }
                    Err(commit_error)
                }
            },
            Err(execute_error) => {
                if let Err(rollback_error) = conn.rollback().await {
                    tracing::warn!(error = %rollback_error, "rollback after failed statement also failed");
                }
                Err(execute_error)
            }
        };

        conn.release().await;
        outcome.map_err(HandleError::Driver)
    }

    /// Run `body` against a scoped connection borrow. On any `Err` returned
    /// by `body`, attempts a best-effort rollback (failures logged and
    /// swallowed) before releasing the connection; the connection is
    /// released on every exit path regardless of outcome.
    ///
    /// `body` returns a boxed future so it can borrow the connection for
    /// the duration of the scope without naming its lifetime explicitly.
    pub async fn cursor<T>(
        &self,
        body: impl for<'c> FnOnce(
            &'c mut F::Connection,
        ) -> Pin<Box<dyn Future<Output = Result<T, Err<F>>> + Send + 'c>>,
    ) -> Result<T, HandleError<Err<F>>> {
        self.ensure_open()?;
        let mut conn = self.pool.acquire().await?;
        let outcome = body(&mut conn).await;

        if outcome.is_err() {
            if let Err(rollback_error) = conn.rollback().await {
                tracing::warn!(error = %rollback_error, "best-effort rollback in cursor() failed");
            }
        }

        conn.release().await;
        outcome.map_err(HandleError::Driver)
    }

    /// Close the underlying pool and mark this handle terminal. Subsequent
    /// operations fail with [`HandleError::Closed`].
    pub async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.pool.close().await;
    }

    /// `true` once [`Handle::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// The underlying pool, for metrics/status reporting.
    #[must_use]
    pub fn pool(&self) -> &Arc<Pool<F>> {
        &self.pool
    }
}
