//! Storage engine seam
//!
//! The manager talks to storage only through [`CacheStore`], so file-backed
//! and in-memory engines are interchangeable.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CacheError;

/// A key/value storage engine with per-entry expiry
pub trait CacheStore: Send + Sync {
    /// Returns the stored value, or `None` if missing or expired
    fn load(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Stores `value` under `key`, expiring `expire` from now
    fn save(&self, key: &str, value: &Value, expire: Duration) -> Result<(), CacheError>;

    /// Removes the entry for `key`, returning whether one existed
    fn remove(&self, key: &str) -> Result<bool, CacheError>;

    /// Removes every entry
    fn clean(&self) -> Result<(), CacheError>;
}

/// A stored value with its write and expiry timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Key the entry was written under
    pub key: String,
    /// The cached data
    pub data: Value,
    /// When the data was cached
    pub cached_at: DateTime<Utc>,
    /// When the cache entry expires
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry written now that expires after `expire`
    pub fn new(key: &str, data: Value, expire: Duration) -> Self {
        let now = Utc::now();
        Self {
            key: key.to_string(),
            data,
            cached_at: now,
            // Saturate rather than overflow on absurd TTLs
            expires_at: now
                .checked_add_signed(expire)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Whether the entry is past its expiry time
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
