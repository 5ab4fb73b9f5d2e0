//! Cache configuration and its layered loader
//!
//! Settings are resolved in order from built-in defaults, an optional TOML
//! file and `CACHEFRONT__`-prefixed environment variables, e.g.
//! `CACHEFRONT__CACHE__ENABLED=false`.

use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::CacheError;

/// Default entry lifetime in minutes
pub const DEFAULT_DURATION_MINUTES: u64 = 180;

/// Prefix for environment variable overrides
const ENV_PREFIX: &str = "CACHEFRONT";

/// Root of the configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The `[cache]` section
    pub cache: CacheConfig,
}

/// Cache behaviour: the enable switch, default TTL and storage location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false, reads always miss and writes are refused
    pub enabled: bool,
    /// Default time-to-live in minutes, used when a write gives no TTL
    pub duration: u64,
    /// Directory for cache files; a temp-dir subpath when unset
    pub directory: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: DEFAULT_DURATION_MINUTES,
            directory: None,
        }
    }
}

impl CacheConfig {
    /// Returns a copy with the enabled flag set to `enabled`
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns a copy storing entries under `directory`
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Returns a copy using `minutes` as the default TTL
    pub fn with_duration(mut self, minutes: u64) -> Self {
        self.duration = minutes;
        self
    }

    /// The configured cache directory, or `<temp>/cachefront/cache`
    pub fn cache_dir(&self) -> PathBuf {
        match &self.directory {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => default_cache_dir(),
        }
    }
}

/// Fallback cache location used when no directory is configured
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("cachefront").join("cache")
}

/// Platform config file location, e.g. `~/.config/cachefront/config.toml`
///
/// Returns `None` if no home directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "cachefront")?;
    Some(project_dirs.config_dir().join("config.toml"))
}

impl Settings {
    /// Loads settings from defaults, a TOML file and the environment
    ///
    /// With `path` set the file must exist. Without it, the platform default
    /// location is consulted and silently skipped when absent.
    pub fn load(path: Option<&Path>) -> Result<Self, CacheError> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                debug!("Loading cache config from: {}", path.display());
                builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
            }
            None => {
                if let Some(default_path) = default_config_path() {
                    if default_path.exists() {
                        debug!("Loading cache config from: {}", default_path.display());
                        builder = builder.add_source(
                            File::from(default_path).format(FileFormat::Toml).required(false),
                        );
                    }
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        info!(
            enabled = settings.cache.enabled,
            duration = settings.cache.duration,
            directory = %settings.cache.cache_dir().display(),
            "Cache configuration loaded"
        );

        Ok(settings)
    }

    /// Rejects settings the cache cannot run with
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.cache.duration == 0 {
            return Err(CacheError::Config(
                "cache.duration must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Looks up a value by dotted path, e.g. `"cache.enabled"`
    pub fn get_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = serde_json::to_value(self).ok()?;

        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }

        serde_json::from_value(current.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).expect("Should write config file");
        path
    }

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.duration, DEFAULT_DURATION_MINUTES);
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_cache_dir_falls_back_to_temp() {
        let config = CacheConfig::default();
        let dir = config.cache_dir();
        assert!(dir.starts_with(std::env::temp_dir()));
        assert!(dir.ends_with("cachefront/cache"));
    }

    #[test]
    fn test_cache_dir_uses_configured_directory() {
        let config = CacheConfig::default().with_directory("/var/cache/app");
        assert_eq!(config.cache_dir(), PathBuf::from("/var/cache/app"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_config(
            &temp_dir,
            "[cache]\nenabled = false\nduration = 15\ndirectory = \"/tmp/somewhere\"\n",
        );

        let settings = Settings::load(Some(&path)).expect("Config should load");

        assert!(!settings.cache.enabled);
        assert_eq!(settings.cache.duration, 15);
        assert_eq!(settings.cache.directory, Some(PathBuf::from("/tmp/somewhere")));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_config(&temp_dir, "[cache]\nduration = 5\n");

        let settings = Settings::load(Some(&path)).expect("Config should load");

        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.duration, 5);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("absent.toml");

        let result = Settings::load(Some(&path));

        assert!(matches!(result, Err(CacheError::Config(_))));
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_config(&temp_dir, "[cache]\nduration = 0\n");

        let err = Settings::load(Some(&path)).unwrap_err();

        assert!(err.to_string().contains("cache.duration"));
    }

    #[test]
    fn test_get_value_by_dotted_key() {
        let settings = Settings {
            cache: CacheConfig::default().with_enabled(false).with_duration(42),
        };

        assert_eq!(settings.get_value::<bool>("cache.enabled"), Some(false));
        assert_eq!(settings.get_value::<u64>("cache.duration"), Some(42));
        assert_eq!(settings.get_value::<bool>("cache.missing"), None);
        assert_eq!(settings.get_value::<bool>("countries.cache.enabled"), None);
        assert_eq!(settings.get_value::<u64>("cache.enabled"), None);
    }

    #[test]
    fn test_default_config_path_names_project() {
        if let Some(path) = default_config_path() {
            let path_str = path.to_string_lossy();
            assert!(path_str.contains("cachefront"));
            assert!(path_str.ends_with("config.toml"));
        }
        // Passes when no home directory is available (e.g. CI)
    }
}
