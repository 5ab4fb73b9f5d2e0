//! cachefront library
//!
//! A key/value cache facade over file-backed storage, with TTLs in minutes,
//! a global enable switch and deterministic key building.
//!
//! ```no_run
//! use cachefront::{CacheConfig, CacheService};
//!
//! let cache = CacheService::new(CacheConfig::default().with_directory("/tmp/demo-cache"));
//! let key = cachefront::cache_key!("countries", "BR").unwrap();
//! let name: String = cache.remember(&key, Some(60), || "Brazil".to_string());
//! assert_eq!(cache.get::<String>(&key).as_deref(), Some(name.as_str()));
//! ```

pub mod cache;
pub mod cli;
pub mod error;
pub mod key;
pub mod settings;

pub use cache::{CacheService, CacheStore, FileStore, Manager, MemoryStore};
pub use error::CacheError;
pub use settings::{CacheConfig, Settings};
