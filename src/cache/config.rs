//! Cache configuration.
//!
//! Controls the process-local response cache via `sortera.toml`.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

// Default values for cache configuration
const DEFAULT_TTL_SECONDS: u64 = 3600;
const DEFAULT_RESPONSE_LIMIT: usize = 200;
const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Cache configuration from `sortera.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the response cache.
    pub enabled: bool,
    /// Seconds before a stored response expires.
    pub ttl_seconds: u64,
    /// Maximum cached responses before LRU eviction.
    pub response_limit: usize,
    /// Largest response body the cache will buffer.
    pub body_limit_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            response_limit: DEFAULT_RESPONSE_LIMIT,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl_seconds: settings.ttl_seconds,
            response_limit: settings.response_limit,
            body_limit_bytes: settings.body_limit_bytes,
        }
    }
}

impl CacheConfig {
    /// Time a stored response stays valid.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Returns the response limit as NonZeroUsize, clamping to 1 if zero.
    pub fn response_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.response_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
