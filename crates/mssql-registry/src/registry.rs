//! The multi-database registry.

use std::collections::HashMap;
use std::sync::Arc;

use mssql_driver_pool::{ConnectionFactory, Pool};
use mssql_handle::{Handle, SqlConnection};
use tokio::sync::{Mutex, RwLock};

use crate::config::{DatabaseConfig, DatabaseInfo};
use crate::error::RegistryError;

type Err<F> = <<F as ConnectionFactory>::Connection as mssql_driver_pool::Connection>::Error;

/// Owns every named database handle, constructing each lazily on first use.
///
/// `get` uses double-checked locking: a fast read-lock path for the common
/// case, falling back to a write-serializing mutex (itself re-checking the
/// map) only on a miss, so at most one handle is ever constructed per
/// alias.
pub struct Registry<F: ConnectionFactory>
where
    F::Connection: SqlConnection,
{
    configs: HashMap<String, DatabaseConfig>,
    handles: RwLock<HashMap<String, Arc<Handle<F>>>>,
    construct: Mutex<()>,
    build_factory: Arc<dyn Fn(&DatabaseConfig) -> F + Send + Sync>,
}

impl<F: ConnectionFactory> Registry<F>
where
    F::Connection: SqlConnection,
{
    /// Construct a registry. Fails if `"default"` is not among `configs`.
    pub fn new(
        configs: HashMap<String, DatabaseConfig>,
        build_factory: impl Fn(&DatabaseConfig) -> F + Send + Sync + 'static,
    ) -> Result<Self, RegistryError<Err<F>>> {
        if !configs.contains_key("default") {
            return Err(RegistryError::UnknownAlias {
                alias: "default".to_string(),
                available: configs.keys().cloned().collect(),
            });
        }
        Ok(Self {
            configs,
            handles: RwLock::new(HashMap::new()),
            construct: Mutex::new(()),
            build_factory: Arc::new(build_factory),
        })
    }

    /// Get (constructing if necessary) the handle for `alias`.
    pub async fn get(&self, alias: &str) -> Result<Arc<Handle<F>>, RegistryError<Err<F>>> {
        if let Some(handle) = self.handles.read().await.get(alias) {
            return Ok(handle.clone());
        }

        let config = self.configs.get(alias).cloned().ok_or_else(|| RegistryError::UnknownAlias {
            alias: alias.to_string(),
            available: self.configs.keys().cloned().collect(),
        })?;

        let _serialize = self.construct.lock().await;

        if let Some(handle) = self.handles.read().await.get(alias) {
            return Ok(handle.clone());
        }

        let factory = (self.build_factory)(&config);
        let pool = Pool::new(factory, config.pool.clone()).await?;
        let handle = Arc::new(Handle::new(Arc::new(pool)));

        self.handles.write().await.insert(alias.to_string(), handle.clone());
        tracing::info!(alias, "database handle constructed");

        Ok(handle)
    }

    /// Close every live handle. Errors closing one handle never prevent the
    /// others from being attempted.
    pub async fn close(&self) {
        let _serialize = self.construct.lock().await;
        let mut handles = self.handles.write().await;
        for (alias, handle) in handles.drain() {
            tracing::info!(alias, "closing database handle");
            handle.close().await;
        }
    }

    /// Close and forget a single handle.
    pub async fn close_one(&self, alias: &str) -> Result<(), RegistryError<Err<F>>> {
        let _serialize = self.construct.lock().await;
        let handle = self.handles.write().await.remove(alias).ok_or_else(|| RegistryError::UnknownAlias {
            alias: alias.to_string(),
            available: self.configs.keys().cloned().collect(),
        })?;
        handle.close().await;
        Ok(())
    }

    /// A non-sensitive summary of every *configured* alias, whether or not
    /// its handle has been materialised.
    #[must_use]
    pub fn info(&self) -> Vec<DatabaseInfo> {
        self.configs
            .iter()
            .map(|(alias, config)| DatabaseInfo {
                name: alias.clone(),
                host: config.host.clone(),
                port: config.port,
                database: config.database.clone(),
            })
            .collect()
    }
}
