//! Cache service facade
//!
//! [`CacheService`] is the entry point for callers: it owns the configuration
//! and a [`Manager`], checks the enabled flag before every read and write,
//! and builds keys from argument lists.
//!
//! Reads and writes (including the lookup and store inside `remember`) are
//! skipped while caching is disabled. `delete`, `delete_multiple` and `clear`
//! always run, so stale entries can be purged with caching switched off.

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::manager::Manager;
use crate::error::CacheError;
use crate::key;
use crate::settings::{CacheConfig, Settings};

/// Facade over a cache manager with an enable switch and key building
pub struct CacheService {
    config: CacheConfig,
    manager: Manager,
}

impl CacheService {
    /// Creates a service with a file-backed manager built from `config`
    pub fn new(config: CacheConfig) -> Self {
        let manager = Manager::new(config.clone());
        Self { config, manager }
    }

    /// Creates a service around an existing manager
    ///
    /// The service's own `config.enabled` gates calls before they reach the
    /// manager, which applies its own flag again.
    pub fn with_manager(config: CacheConfig, manager: Manager) -> Self {
        Self { config, manager }
    }

    /// Creates a service from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.cache.clone())
    }

    /// Creates a service from the default config file and environment
    pub fn from_default_config() -> Result<Self, CacheError> {
        Ok(Self::from_settings(&Settings::load(None)?))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// Whether cache reads and writes are enabled
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Builds a deterministic key from an ordered argument list
    ///
    /// See [`key::make_key`]; fails with [`CacheError::EmptyKey`] when given
    /// no arguments.
    pub fn make_key<A: Serialize + ?Sized>(&self, args: &A) -> Result<String, CacheError> {
        key::make_key(args)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.enabled() {
            return None;
        }
        self.manager.get(key)
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Stores a value for `ttl` minutes; `false` when disabled
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<u64>) -> bool {
        if !self.enabled() {
            debug!(key, "Cache disabled, write skipped");
            return false;
        }
        self.manager.set(key, value, ttl)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.manager.delete(key)
    }

    pub fn clear(&self) -> bool {
        self.manager.clear()
    }

    pub fn has(&self, key: &str) -> bool {
        self.enabled() && self.manager.has(key)
    }

    pub fn get_multiple<T, K, I>(&self, keys: I, default: T) -> Vec<(String, T)>
    where
        T: DeserializeOwned + Clone,
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        if !self.enabled() {
            return keys
                .into_iter()
                .map(|key| (key.as_ref().to_string(), default.clone()))
                .collect();
        }
        self.manager.get_multiple(keys, default)
    }

    pub fn set_multiple<K, V, I>(&self, pairs: I, ttl: Option<u64>) -> bool
    where
        K: AsRef<str>,
        V: Serialize,
        I: IntoIterator<Item = (K, V)>,
    {
        if !self.enabled() {
            return false;
        }
        self.manager.set_multiple(pairs, ttl)
    }

    pub fn delete_multiple<K, I>(&self, keys: I) -> bool
    where
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        self.manager.delete_multiple(keys)
    }

    /// Returns the cached value, or computes, stores and returns it
    ///
    /// While disabled, `producer` runs on every call and nothing is stored.
    /// Concurrent misses may each run `producer`.
    pub fn remember<T, F>(&self, key: &str, ttl: Option<u64>, producer: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if !self.enabled() {
            return producer();
        }
        self.manager.remember(key, ttl, producer)
    }

    pub fn try_remember<T, E, F>(&self, key: &str, ttl: Option<u64>, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        if !self.enabled() {
            return producer();
        }
        self.manager.try_remember(key, ttl, producer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryStore;
    use crate::cache::store::CacheStore;
    use chrono::Duration;
    use serde_json::Value;
    use std::cell::Cell;
    use std::sync::Arc;

    fn service_with_store(enabled: bool) -> (CacheService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let manager = Manager::with_store(CacheConfig::default(), store.clone());
        let config = CacheConfig::default().with_enabled(enabled);
        (CacheService::with_manager(config, manager), store)
    }

    #[test]
    fn test_make_key_requires_arguments() {
        let (service, _store) = service_with_store(true);

        assert!(matches!(service.make_key(&()), Err(CacheError::EmptyKey)));
        assert_eq!(
            service.make_key(&("a", "b")).unwrap(),
            service.make_key(&("a", "b")).unwrap()
        );
    }

    #[test]
    fn test_get_set_round_trip_when_enabled() {
        let (service, _store) = service_with_store(true);

        assert!(service.set("a", "1", Some(60)));
        assert_eq!(service.get::<String>("a"), Some("1".to_string()));
        assert!(service.has("a"));
    }

    #[test]
    fn test_service_flag_gates_an_enabled_manager() {
        let (service, store) = service_with_store(false);
        store.save("k", &Value::from("stored"), Duration::minutes(5)).unwrap();

        assert_eq!(service.get::<String>("k"), None);
        assert_eq!(service.get_or("k", "default".to_string()), "default");
        assert!(!service.has("k"));
        assert!(!service.set("new", &1, None));
        assert!(!service.set_multiple([("x", 1)], None));
        assert_eq!(
            service.get_multiple(["k"], String::from("none")),
            vec![("k".to_string(), "none".to_string())]
        );
        assert!(store.load("new").unwrap().is_none());
        assert!(store.load("x").unwrap().is_none());
    }

    #[test]
    fn test_delete_and_clear_ignore_flag() {
        let (service, store) = service_with_store(false);
        store.save("a", &Value::from(1), Duration::minutes(5)).unwrap();
        store.save("b", &Value::from(2), Duration::minutes(5)).unwrap();
        store.save("c", &Value::from(3), Duration::minutes(5)).unwrap();

        assert!(service.delete("a"));
        assert!(service.delete_multiple(["b"]));
        assert_eq!(store.len(), 1);

        assert!(service.clear());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remember_caches_result() {
        let (service, store) = service_with_store(true);
        let calls = Cell::new(0);

        let produce = || {
            calls.set(calls.get() + 1);
            42u32
        };
        assert_eq!(service.remember("answer", Some(1), produce), 42);
        assert_eq!(service.remember("answer", Some(1), produce), 42);

        assert_eq!(calls.get(), 1);
        assert_eq!(store.load("answer").unwrap(), Some(Value::from(42)));
    }

    #[test]
    fn test_remember_disabled_skips_cache() {
        let (service, store) = service_with_store(false);
        store.save("answer", &Value::from(1), Duration::minutes(5)).unwrap();

        let value: u32 = service.remember("answer", None, || 2);

        assert_eq!(value, 2);
        assert_eq!(store.load("answer").unwrap(), Some(Value::from(1)));
    }

    #[test]
    fn test_bulk_round_trip() {
        let (service, _store) = service_with_store(true);

        assert!(service.set_multiple(vec![("x", "1"), ("y", "2")], None));
        assert_eq!(
            service.get_multiple(["x", "y", "z"], String::new()),
            vec![
                ("x".to_string(), "1".to_string()),
                ("y".to_string(), "2".to_string()),
                ("z".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_new_uses_configured_directory() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let service = CacheService::new(CacheConfig::default().with_directory(temp_dir.path()));

        assert_eq!(service.manager().cache_dir(), temp_dir.path());
        assert!(service.set("k", &[1, 2], None));
        assert_eq!(service.get::<Vec<i32>>("k"), Some(vec![1, 2]));
    }
}
