//! File-backed storage engine
//!
//! Each entry is a pretty-printed JSON file named after the SHA-256 of its key,
//! so arbitrary keys (including base64 with `/` and `+`) map to safe names.

use chrono::Duration;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::store::{CacheEntry, CacheStore};
use crate::error::CacheError;

/// Permissions for a newly created cache directory
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Stores cache entries as JSON files in a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `cache_dir`, creating the directory if missing
    pub fn open(cache_dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let store = Self {
            cache_dir: cache_dir.into(),
        };
        store.ensure_dir()?;
        Ok(store)
    }

    /// Directory holding the entry files
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.cache_dir.join(format!("{}.json", hex::encode(digest)))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        if self.cache_dir.is_dir() {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(DIR_MODE);
        }

        debug!("Creating cache directory {}", self.cache_dir.display());
        builder.create(&self.cache_dir)
    }

    /// Reads and parses the entry file, treating unparseable files as absent
    fn read_entry(&self, path: &Path) -> Result<Option<CacheEntry>, CacheError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                debug!("Ignoring unreadable cache file {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }
}

/// Whether `path` looks like an entry file: `<64 hex chars>.json`
fn is_entry_file(path: &Path) -> bool {
    if !path.is_file() || !path.extension().is_some_and(|ext| ext == "json") {
        return false;
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.len() == 64 && stem.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Removes a file, returning whether it existed
fn remove_if_exists(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

impl CacheStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let path = self.cache_path(key);
        let Some(entry) = self.read_entry(&path)? else {
            return Ok(None);
        };

        if entry.key != key {
            return Ok(None);
        }

        if entry.is_expired() {
            debug!(key, "Cache entry expired");
            remove_if_exists(&path)?;
            return Ok(None);
        }

        Ok(Some(entry.data))
    }

    fn save(&self, key: &str, value: &Value, expire: Duration) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let entry = CacheEntry::new(key, value.clone(), expire);
        let json = serde_json::to_string_pretty(&entry)?;

        fs::write(self.cache_path(key), json)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        Ok(remove_if_exists(&self.cache_path(key))?)
    }

    fn clean(&self) -> Result<(), CacheError> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            if is_entry_file(&path) {
                remove_if_exists(&path)?;
            }
        }

        Ok(())
    }
}
