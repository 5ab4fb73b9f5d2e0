//! Cache layers: storage engines, the manager adapter and the service facade
//!
//! Callers normally use [`CacheService`], which checks the enabled flag and
//! forwards to a [`Manager`]. The manager speaks to a [`CacheStore`]; entries
//! live either as JSON files ([`FileStore`]) or in memory ([`MemoryStore`]).

mod file;
mod manager;
mod memory;
mod service;
mod store;

pub use file::FileStore;
pub use manager::Manager;
pub use memory::MemoryStore;
pub use service::CacheService;
pub use store::{CacheEntry, CacheStore};
