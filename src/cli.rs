//! Command-line interface for inspecting and managing a cache directory
//!
//! Parses arguments with clap, resolves the cache configuration (config file,
//! environment, then command-line overrides) and runs one cache operation.

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

use crate::cache::CacheService;
use crate::error::CacheError;
use crate::settings::{CacheConfig, Settings};

/// Error types for CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration, key building or storage failed
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// `get` found no live entry
    #[error("Key not found: '{0}'")]
    NotFound(String),
}

/// cachefront - inspect and manage a file-backed key/value cache
#[derive(Parser, Debug)]
#[command(name = "cachefront")]
#[command(about = "Inspect and manage a file-backed key/value cache")]
#[command(version)]
pub struct Cli {
    /// Config file to load instead of the platform default
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Cache directory, overriding the configured one
    #[arg(long, value_name = "DIR", global = true)]
    pub dir: Option<PathBuf>,

    /// Treat the cache as disabled: reads miss and writes are refused
    #[arg(long, global = true)]
    pub disable: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Cache operations available from the command line
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the value stored under KEY as JSON
    Get { key: String },

    /// Store VALUE (JSON, or a plain string) under KEY
    Set {
        key: String,
        value: String,
        /// Lifetime in minutes; the configured duration when omitted
        #[arg(long, value_name = "MINUTES")]
        ttl: Option<u64>,
    },

    /// Remove the entry for KEY
    Delete { key: String },

    /// Remove every entry
    Clear,

    /// Report whether KEY has a live entry
    Has { key: String },

    /// Print the cache key built from ARGS
    ///
    /// Each argument is read as JSON when it parses, otherwise as a string.
    Key { args: Vec<String> },
}

/// Parses a command-line value as JSON, falling back to a plain string
///
/// `42` and `{"a":1}` become numbers and objects; `hello` becomes `"hello"`.
pub fn parse_value(s: &str) -> Value {
    serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string()))
}

impl Cli {
    /// Resolves the cache configuration for this invocation
    ///
    /// `--dir` and `--disable` take precedence over file and environment.
    pub fn cache_config(&self) -> Result<CacheConfig, CliError> {
        let settings = Settings::load(self.config.as_deref())?;
        let mut config = settings.cache;

        if let Some(dir) = &self.dir {
            config = config.with_directory(dir);
        }
        if self.disable {
            config = config.with_enabled(false);
        }

        Ok(config)
    }
}

/// Runs one command against `service`, returning the text to print
pub fn execute(command: &Command, service: &CacheService) -> Result<String, CliError> {
    match command {
        Command::Get { key } => service
            .get::<Value>(key)
            .map(|value| value.to_string())
            .ok_or_else(|| CliError::NotFound(key.clone())),
        Command::Set { key, value, ttl } => {
            Ok(service.set(key, &parse_value(value), *ttl).to_string())
        }
        Command::Delete { key } => Ok(service.delete(key).to_string()),
        Command::Clear => Ok(service.clear().to_string()),
        Command::Has { key } => Ok(service.has(key).to_string()),
        Command::Key { args } => {
            let values: Vec<Value> = args.iter().map(|arg| parse_value(arg)).collect();
            Ok(service.make_key(&values)?)
        }
    }
}
