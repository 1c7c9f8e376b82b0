//! Store read configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Bounds on subscription and registry reads.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// After this long a status read falls back to cached data.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,

    /// Users kept in the last-known-good status cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Cached records older than this are not served as a fallback.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl StoreConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fetch_timeout_ms == 0 || self.fetch_timeout_ms > 60_000 {
            return Err(ValidationError::InvalidFetchTimeout);
        }
        if self.cache_capacity == 0 || self.cache_ttl_secs == 0 {
            return Err(ValidationError::InvalidCacheLimits);
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    3000
}

fn default_cache_capacity() -> usize {
    10_000
}

fn default_cache_ttl() -> u64 {
    15 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_three_seconds() {
        assert_eq!(StoreConfig::default().fetch_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = StoreConfig {
            fetch_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidFetchTimeout));
    }

    #[test]
    fn test_unbounded_cache_is_rejected() {
        let config = StoreConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidCacheLimits));
    }
}
