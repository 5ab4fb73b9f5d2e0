//! Error types shared across the cache layers

use thiserror::Error;

/// Errors raised by key building, the storage engines and config loading
///
/// The cache interface itself (`get`, `set`, ...) never returns these; engine
/// failures there are logged and reported as a miss or `false`.
#[derive(Debug, Error)]
pub enum CacheError {
    /// `make_key` was called without arguments
    #[error("Empty key")]
    EmptyKey,

    /// Reading or writing the cache directory failed
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value or entry could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for CacheError {
    fn from(err: config::ConfigError) -> Self {
        CacheError::Config(err.to_string())
    }
}
