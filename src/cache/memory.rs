//! In-process storage engine, used for tests and throwaway caches

use chrono::Duration;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

use super::store::{CacheEntry, CacheStore};
use crate::error::CacheError;

/// Keeps cache entries in a map; contents are lost on drop
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CacheStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, CacheError> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.data.clone())),
                Some(_) => {}
            }
        }

        // Re-check under the write lock; a writer may have refreshed the entry
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
        }
        Ok(None)
    }

    fn save(&self, key: &str, value: &Value, expire: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry::new(key, value.clone(), expire);
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn clean(&self) -> Result<(), CacheError> {
        self.entries.write().clear();
        Ok(())
    }
}
