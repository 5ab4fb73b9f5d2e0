//! Cache manager binding the cache interface to a storage engine
//!
//! The manager owns a [`CacheStore`], converts typed values to and from JSON,
//! turns TTLs in minutes into expiry times and honours the enabled flag for
//! reads and writes. Engine failures are logged and reported as a miss or
//! `false`; nothing here panics or retries.

use chrono::Duration;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::file::FileStore;
use super::store::CacheStore;
use crate::settings::CacheConfig;

/// Largest TTL in minutes a `chrono::Duration` can hold
const MAX_TTL_MINUTES: u64 = (i64::MAX / 60_000) as u64;

/// Converts a TTL in minutes to a duration, saturating on overflow
fn minutes_to_duration(minutes: u64) -> Duration {
    Duration::minutes(minutes.min(MAX_TTL_MINUTES) as i64)
}

/// Adapts a storage engine to the uniform cache interface
///
/// Built with [`Manager::new`], the file engine is bound lazily: the cache
/// directory is created (with parents) on the first operation that needs
/// storage. [`Manager::with_store`] binds any engine up front.
pub struct Manager {
    config: CacheConfig,
    store: OnceLock<Arc<dyn CacheStore>>,
}

impl Manager {
    /// Creates a manager backed by files under `config.cache_dir()`
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            store: OnceLock::new(),
        }
    }

    /// Creates a manager over an already constructed engine
    pub fn with_store(config: CacheConfig, store: Arc<dyn CacheStore>) -> Self {
        Self {
            config,
            store: OnceLock::from(store),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Directory the file engine stores entries in
    pub fn cache_dir(&self) -> PathBuf {
        self.config.cache_dir()
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Returns the bound engine, binding the file engine on first use
    ///
    /// A failed bind is logged and retried on the next call.
    fn store(&self) -> Option<&Arc<dyn CacheStore>> {
        if let Some(store) = self.store.get() {
            return Some(store);
        }

        let dir = self.cache_dir();
        match FileStore::open(&dir) {
            Ok(store) => Some(self.store.get_or_init(|| Arc::new(store))),
            Err(e) => {
                warn!(directory = %dir.display(), error = %e, "Failed to open cache directory");
                None
            }
        }
    }

    /// Expiry for a write: `ttl` minutes, or the configured default when
    /// `ttl` is `None` or zero
    fn expiration(&self, ttl: Option<u64>) -> Duration {
        let minutes = match ttl {
            Some(minutes) if minutes > 0 => minutes,
            _ => self.config.duration,
        };
        minutes_to_duration(minutes)
    }

    fn load(&self, key: &str) -> Option<Value> {
        if !self.enabled() {
            return None;
        }

        match self.store()?.load(key) {
            // A stored null is never a live entry
            Ok(Some(Value::Null)) | Ok(None) => {
                debug!(key, "Cache miss");
                None
            }
            Ok(Some(value)) => {
                debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Cache read failed");
                None
            }
        }
    }

    /// Fetches a value, or `None` if missing, expired, disabled or of
    /// another type
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.load(key)?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(key, error = %e, "Cached value has an unexpected shape");
                None
            }
        }
    }

    /// Fetches a value, falling back to `default`
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Stores a value for `ttl` minutes (the configured duration when
    /// `None` or zero). Returns `false` when disabled or on engine failure.
    ///
    /// A value that serializes to `null` (e.g. `None`) removes the entry
    /// instead of storing it.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<u64>) -> bool {
        if !self.enabled() {
            return false;
        }

        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Value cannot be cached");
                return false;
            }
        };

        let Some(store) = self.store() else {
            return false;
        };

        if value.is_null() {
            return match store.remove(key) {
                Ok(_) => {
                    debug!(key, "Null value, cache entry removed");
                    true
                }
                Err(e) => {
                    warn!(key, error = %e, "Cache delete failed");
                    false
                }
            };
        }

        match store.save(key, &value, self.expiration(ttl)) {
            Ok(()) => {
                debug!(key, "Cache write");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "Cache write failed");
                false
            }
        }
    }

    /// Removes one entry; runs even when caching is disabled
    ///
    /// Returns `true` unless the engine failed. Removing an absent key
    /// succeeds.
    pub fn delete(&self, key: &str) -> bool {
        let Some(store) = self.store() else {
            return false;
        };

        match store.remove(key) {
            Ok(existed) => {
                debug!(key, existed, "Cache delete");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "Cache delete failed");
                false
            }
        }
    }

    /// Removes every entry; runs even when caching is disabled
    pub fn clear(&self) -> bool {
        let Some(store) = self.store() else {
            return false;
        };

        match store.clean() {
            Ok(()) => {
                info!("Cache cleared");
                true
            }
            Err(e) => {
                warn!(error = %e, "Cache clear failed");
                false
            }
        }
    }

    /// Whether a live entry exists for `key`
    pub fn has(&self, key: &str) -> bool {
        self.load(key).is_some()
    }

    /// Fetches several keys in order, substituting `default` for misses
    pub fn get_multiple<T, K, I>(&self, keys: I, default: T) -> Vec<(String, T)>
    where
        T: DeserializeOwned + Clone,
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        keys.into_iter()
            .map(|key| {
                let key = key.as_ref();
                let value = self.get(key).unwrap_or_else(|| default.clone());
                (key.to_string(), value)
            })
            .collect()
    }

    /// Stores every pair; `true` only if all writes succeeded
    pub fn set_multiple<K, V, I>(&self, pairs: I, ttl: Option<u64>) -> bool
    where
        K: AsRef<str>,
        V: Serialize,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .fold(true, |ok, (key, value)| self.set(key.as_ref(), &value, ttl) && ok)
    }

    /// Deletes every key; `true` only if all deletes succeeded
    pub fn delete_multiple<K, I>(&self, keys: I) -> bool
    where
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        keys.into_iter()
            .fold(true, |ok, key| self.delete(key.as_ref()) && ok)
    }

    /// Returns the cached value, or computes, stores and returns it
    ///
    /// There is no single-flight guarantee: concurrent callers missing on the
    /// same key each run `producer`, and the last write wins.
    pub fn remember<T, F>(&self, key: &str, ttl: Option<u64>, producer: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(key) {
            return value;
        }

        let value = producer();
        self.set(key, &value, ttl);
        value
    }

    /// Like [`remember`](Self::remember) for a fallible producer; an error
    /// is returned as-is and nothing is stored
    pub fn try_remember<T, E, F>(&self, key: &str, ttl: Option<u64>, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = producer()?;
        self.set(key, &value, ttl);
        Ok(value)
    }
}
