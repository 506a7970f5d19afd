//! A mock pooled connection shared by every gateway crate's unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mssql_driver_pool::{Connection, ConnectionFactory};
use mssql_handle::{QueryResult, SqlConnection};
use mssql_types::SqlValue;
use parking_lot::Mutex;
use thiserror::Error;

/// The error type every [`MockConnection`] operation returns on failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MockError(pub String);

/// A record of every call made against connections produced by a single
/// [`MockConnectionFactory`], aggregated across every connection it made
/// (the pool may hand out several over a test's lifetime).
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    /// SQL text passed to every `query()` call, in order.
    pub queries: Vec<String>,
    /// SQL text passed to every `execute()` call, in order.
    pub executes: Vec<String>,
    /// Number of `health_check()` calls.
    pub health_checks: u32,
    /// Number of `reset()` calls.
    pub resets: u32,
    /// Number of `commit()` calls.
    pub commits: u32,
    /// Number of `rollback()` calls.
    pub rollbacks: u32,
}

/// Canned behaviour for every [`MockConnection`] a factory produces.
#[derive(Debug, Clone)]
pub struct MockScript {
    /// `health_check()` succeeds iff this is `true`.
    pub healthy: bool,
    /// `reset()` fails (simulating a poisoned/broken connection) iff `true`.
    pub fail_reset: bool,
    /// The `QueryResult` every `query()` call returns, absent an injected failure.
    pub query_result: QueryResult,
    /// The affected-row count every `execute()` call returns, absent an injected failure.
    pub affected_rows: u64,
    /// If set, `query()` fails with this message instead of returning `query_result`.
    pub fail_query: Option<String>,
    /// If set, `execute()` fails with this message instead of returning `affected_rows`.
    pub fail_execute: Option<String>,
}

impl Default for MockScript {
    fn default() -> Self {
        Self {
            healthy: true,
            fail_reset: false,
            query_result: QueryResult::default(),
            affected_rows: 0,
            fail_query: None,
            fail_execute: None,
        }
    }
}

/// A connection that replays a [`MockScript`] and records every call it
/// receives into a shared [`CallLog`].
pub struct MockConnection {
    log: Arc<Mutex<CallLog>>,
    script: Arc<Mutex<MockScript>>,
}

#[async_trait]
impl Connection for MockConnection {
    type Error = MockError;

    async fn health_check(&mut self, _query: &str) -> Result<(), Self::Error> {
        self.log.lock().health_checks += 1;
        if self.script.lock().healthy {
            Ok(())
        } else {
            Err(MockError("health check failed".to_string()))
        }
    }

    async fn reset(&mut self) -> Result<(), Self::Error> {
        self.log.lock().resets += 1;
        if self.script.lock().fail_reset {
            Err(MockError("reset failed".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SqlConnection for MockConnection {
    async fn query(&mut self, sql: &str, _params: &[SqlValue]) -> Result<QueryResult, Self::Error> {
        self.log.lock().queries.push(sql.to_string());
        let script = self.script.lock();
        if let Some(message) = &script.fail_query {
            return Err(MockError(message.clone()));
        }
        Ok(script.query_result.clone())
    }

    async fn execute(&mut self, sql: &str, _params: &[SqlValue]) -> Result<u64, Self::Error> {
        self.log.lock().executes.push(sql.to_string());
        let script = self.script.lock();
        if let Some(message) = &script.fail_execute {
            return Err(MockError(message.clone()));
        }
        Ok(script.affected_rows)
    }

    async fn commit(&mut self) -> Result<(), Self::Error> {
        self.log.lock().commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), Self::Error> {
        self.log.lock().rollbacks += 1;
        Ok(())
    }
}

/// Produces [`MockConnection`]s sharing one [`CallLog`] and [`MockScript`].
pub struct MockConnectionFactory {
    log: Arc<Mutex<CallLog>>,
    script: Arc<Mutex<MockScript>>,
    created: AtomicUsize,
}

impl MockConnectionFactory {
    /// A factory with default (always-healthy, empty-result) behaviour.
    #[must_use]
    pub fn new() -> Self {
        Self::with_script(MockScript::default())
    }

    /// A factory seeded with specific canned behaviour.
    #[must_use]
    pub fn with_script(script: MockScript) -> Self {
        Self { log: Arc::new(Mutex::new(CallLog::default())), script: Arc::new(Mutex::new(script)), created: AtomicUsize::new(0) }
    }

    /// A snapshot of every call recorded so far, across every connection
    /// this factory has produced.
    #[must_use]
    pub fn log(&self) -> CallLog {
        self.log.lock().clone()
    }

    /// How many connections this factory has produced.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Mutate the shared script, e.g. to make a later `reset()` call fail.
    pub fn update_script(&self, update: impl FnOnce(&mut MockScript)) {
        update(&mut self.script.lock());
    }
}

impl Default for MockConnectionFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionFactory for MockConnectionFactory {
    type Connection = MockConnection;

    async fn connect(&self) -> Result<Self::Connection, MockError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection { log: self.log.clone(), script: self.script.clone() })
    }
}
