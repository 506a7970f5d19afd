//! Pool configuration.

use std::time::Duration;

/// The default health-check query, matching SQL Server's cheapest liveness probe.
pub const DEFAULT_HEALTH_CHECK_QUERY: &str = "SELECT 1";

/// Configuration for a [`Pool`](crate::pool::Pool).
///
/// `0` disables the respective time-based policy (`idle_timeout`,
/// `health_check_interval`, `max_lifetime`); `acquire_timeout` has no such
/// escape hatch since an unbounded wait would defeat the pool's own
/// cancellation-responsiveness guarantee.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of connections eagerly created at pool startup.
    pub min_size: u32,
    /// Maximum number of live connections (parked + checked out).
    pub max_size: u32,
    /// How long an idle, parked connection may sit before it is retired.
    /// `Duration::ZERO` disables idle retirement.
    pub idle_timeout: Duration,
    /// How often a parked connection is health-checked on acquire.
    /// `Duration::ZERO` disables health checks.
    pub health_check_interval: Duration,
    /// Maximum age of a connection before it is retired regardless of use.
    /// `Duration::ZERO` disables lifetime-based retirement.
    pub max_lifetime: Duration,
    /// How long `acquire()` will wait for a connection before failing.
    pub acquire_timeout: Duration,
    /// The query used for health checks.
    pub health_check_query: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: 10,
            idle_timeout: Duration::from_secs(600),
            health_check_interval: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(1800),
            acquire_timeout: Duration::from_secs(30),
            health_check_query: DEFAULT_HEALTH_CHECK_QUERY.to_string(),
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum pool size.
    #[must_use]
    pub fn min_size(mut self, count: u32) -> Self {
        self.min_size = count;
        self
    }

    /// Set the maximum pool size.
    #[must_use]
    pub fn max_size(mut self, count: u32) -> Self {
        self.max_size = count;
        self
    }

    /// Set the idle timeout.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the health-check interval.
    #[must_use]
    pub fn health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    /// Set the maximum connection lifetime.
    #[must_use]
    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Set the acquire timeout.
    #[must_use]
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Set a custom health-check query.
    #[must_use]
    pub fn health_check_query(mut self, query: impl Into<String>) -> Self {
        self.health_check_query = query.into();
        self
    }

    /// Validate the configuration, per spec.md §3: `min_size`/`max_size`
    /// positive with `min_size <= max_size`; the remaining durations merely
    /// non-negative (which `Duration` guarantees by construction).
    pub fn validate(&self) -> Result<(), String> {
        if self.min_size == 0 {
            return Err("min_size must be positive".to_string());
        }
        if self.max_size == 0 {
            return Err("max_size must be positive".to_string());
        }
        if self.min_size > self.max_size {
            return Err(format!(
                "min_size ({}) must be <= max_size ({})",
                self.min_size, self.max_size
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_greater_than_max_rejected() {
        let config = PoolConfig::new().min_size(5).max_size(2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_sizes_rejected() {
        assert!(PoolConfig::new().min_size(0).validate().is_err());
        assert!(PoolConfig::new().max_size(0).validate().is_err());
    }

    #[test]
    fn equal_min_max_accepted() {
        assert!(PoolConfig::new().min_size(3).max_size(3).validate().is_ok());
    }
}
