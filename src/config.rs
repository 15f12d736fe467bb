//! Configuration Module
//!
//! Handles loading and validating disk cache configuration.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Default number of redundant journal lines tolerated before compaction
pub const DEFAULT_COMPACT_THRESHOLD: usize = 2000;

/// Default buffer size for pooled value and journal streams
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Default number of released bytes the buffer pool keeps around
pub const DEFAULT_POOL_LIMIT: usize = 64 * 1024;

/// Disk cache configuration parameters.
///
/// `directory`, `app_version`, `value_count` and `max_size` are fixed for the
/// lifetime of an opened cache; `max_size` can be changed later through
/// [`DiskCache::set_max_size`](crate::DiskCache::set_max_size).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory owned exclusively by the cache
    pub directory: PathBuf,
    /// Owner-supplied version; a mismatch invalidates the whole cache
    pub app_version: u32,
    /// Number of value slots per entry
    pub value_count: usize,
    /// Byte budget for committed values
    pub max_size: u64,
    /// Redundant journal lines tolerated before the journal is rebuilt
    pub compact_threshold: usize,
    /// Buffer size for pooled streams
    pub buffer_size: usize,
    /// Bytes of released buffers the pool retains
    pub pool_limit: usize,
}

impl CacheConfig {
    /// Creates a config with the four mandatory parameters and default tuning.
    pub fn new(
        directory: impl Into<PathBuf>,
        app_version: u32,
        value_count: usize,
        max_size: u64,
    ) -> Self {
        Self {
            directory: directory.into(),
            app_version,
            value_count,
            max_size,
            ..Self::default()
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `JOURNAL_CACHE_DIR` - Cache directory (default: `journal-cache`)
    /// - `JOURNAL_CACHE_APP_VERSION` - Application version (default: 1)
    /// - `JOURNAL_CACHE_VALUE_COUNT` - Values per entry (default: 1)
    /// - `JOURNAL_CACHE_MAX_SIZE` - Byte budget (default: 10 MiB)
    /// - `JOURNAL_CACHE_COMPACT_THRESHOLD` - Journal compaction threshold (default: 2000)
    /// - `JOURNAL_CACHE_BUFFER_SIZE` - Stream buffer size (default: 8192)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            directory: env::var("JOURNAL_CACHE_DIR")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.directory),
            app_version: parse_var("JOURNAL_CACHE_APP_VERSION").unwrap_or(defaults.app_version),
            value_count: parse_var("JOURNAL_CACHE_VALUE_COUNT").unwrap_or(defaults.value_count),
            max_size: parse_var("JOURNAL_CACHE_MAX_SIZE").unwrap_or(defaults.max_size),
            compact_threshold: parse_var("JOURNAL_CACHE_COMPACT_THRESHOLD")
                .unwrap_or(defaults.compact_threshold),
            buffer_size: parse_var("JOURNAL_CACHE_BUFFER_SIZE").unwrap_or(defaults.buffer_size),
            pool_limit: defaults.pool_limit,
        }
    }

    pub fn with_compact_threshold(mut self, threshold: usize) -> Self {
        self.compact_threshold = threshold;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_pool_limit(mut self, pool_limit: usize) -> Self {
        self.pool_limit = pool_limit;
        self
    }

    /// Rejects values the cache cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if self.value_count == 0 {
            return Err(CacheError::InvalidConfig(
                "value_count must be greater than zero".to_string(),
            ));
        }
        if self.buffer_size == 0 {
            return Err(CacheError::InvalidConfig(
                "buffer_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("journal-cache"),
            app_version: 1,
            value_count: 1,
            max_size: 10 * 1024 * 1024,
            compact_threshold: DEFAULT_COMPACT_THRESHOLD,
            buffer_size: DEFAULT_BUFFER_SIZE,
            pool_limit: DEFAULT_POOL_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.app_version, 1);
        assert_eq!(config.value_count, 1);
        assert_eq!(config.compact_threshold, 2000);
        assert_eq!(config.buffer_size, 8192);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("JOURNAL_CACHE_DIR");
        env::remove_var("JOURNAL_CACHE_APP_VERSION");
        env::remove_var("JOURNAL_CACHE_VALUE_COUNT");
        env::remove_var("JOURNAL_CACHE_MAX_SIZE");
        env::remove_var("JOURNAL_CACHE_COMPACT_THRESHOLD");
        env::remove_var("JOURNAL_CACHE_BUFFER_SIZE");

        let config = CacheConfig::from_env();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_config_validate_rejects_zero() {
        let config = CacheConfig::new("dir", 1, 0, 1024);
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));

        let config = CacheConfig::new("dir", 1, 2, 0);
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));

        let config = CacheConfig::new("dir", 1, 2, 1024).with_buffer_size(0);
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::new("/tmp/c", 7, 2, 4096)
            .with_compact_threshold(10)
            .with_pool_limit(0);
        assert_eq!(config.app_version, 7);
        assert_eq!(config.value_count, 2);
        assert_eq!(config.max_size, 4096);
        assert_eq!(config.compact_threshold, 10);
        assert_eq!(config.pool_limit, 0);
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
    }
}
