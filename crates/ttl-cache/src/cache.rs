//! The core TTL map.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Point-in-time counts for [`Cache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Total entries currently stored, expired or not.
    pub total: usize,
    /// Entries not yet expired.
    pub valid: usize,
    /// Entries past their expiry.
    pub expired: usize,
    /// The default TTL new entries receive via [`Cache::set`].
    pub default_ttl: Duration,
}

/// A single mutex-guarded map from string key to `(value, expiry)`.
///
/// The mutex is held only for the duration of each map mutation, never
/// across an `await`, so it composes safely with async callers.
pub struct Cache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> Cache<V> {
    /// Create an empty cache using `default_ttl` for [`Cache::set`].
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self { entries: Mutex::new(HashMap::new()), default_ttl }
    }

    /// Fetch `key`, returning `None` if absent or expired. An expired entry
    /// is evicted as a side effect of this call.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key` with this cache's default TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store `value` under `key` with an explicit TTL.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.entries.lock().insert(key.into(), Entry { value, expires_at: Instant::now() + ttl });
    }

    /// Remove `key`, if present.
    pub fn invalidate(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Evict every currently-expired entry; returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// A snapshot of total/valid/expired counts.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries.lock();
        let total = entries.len();
        let valid = entries.values().filter(|entry| entry.expires_at > now).count();
        CacheStats { total, valid, expired: total - valid, default_ttl: self.default_ttl }
    }

    /// Return the cached value for `key` if present and unexpired;
    /// otherwise await `compute`, cache its result with this cache's
    /// default TTL, and return it.
    ///
    /// The decorator-style realization of memoisation: `compute` is the raw
    /// operation, and this method is the wrapped operation sharing the
    /// cache.
    pub async fn get_or_compute<Fut>(&self, key: impl Into<String>, compute: impl FnOnce() -> Fut) -> V
    where
        Fut: std::future::Future<Output = V>,
    {
        let key = key.into();
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute().await;
        self.set(key, value.clone());
        value
    }

    /// Like [`Cache::get_or_compute`], but for a fallible operation: only
    /// `Ok` results are cached.
    pub async fn get_or_try_compute<Fut, E>(
        &self,
        key: impl Into<String>,
        compute: impl FnOnce() -> Fut,
    ) -> Result<V, E>
    where
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        let key = key.into();
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute().await?;
        self.set(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn set_then_get_round_trips() {
        let cache = Cache::new(Duration::from_secs(60));
        cache.set("k", 42);
        assert_eq!(cache.get("k"), Some(42));
    }

    #[test]
    fn expired_entries_read_as_absent_and_are_evicted() {
        let cache = Cache::new(Duration::from_millis(0));
        cache.set("k", 42);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().total, 0);
    }

    #[test]
    fn cleanup_expired_removes_only_expired_entries() {
        let cache = Cache::new(Duration::from_secs(60));
        cache.set("fresh", 1);
        cache.set_with_ttl("stale", 2, Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.get("fresh"), Some(1));
    }

    #[tokio::test]
    async fn get_or_compute_calls_the_function_once_for_repeated_keys() {
        let cache = Cache::new(Duration::from_secs(60));
        let calls = std::sync::atomic::AtomicU32::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute("k", || async {
                    calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    99
                })
                .await;
            assert_eq!(value, 99);
        }

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
