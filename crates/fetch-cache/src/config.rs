//! Cache configuration

use std::time::Duration;

use crate::error::ConfigError;

/// Default fresh window: 30 minutes
pub const DEFAULT_FRESH_WINDOW: Duration = Duration::from_secs(30 * 60);
/// Default stale window: 60 minutes total
pub const DEFAULT_STALE_WINDOW: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_ENTRIES: usize = 150;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Windows and bounds for a [`FetchCache`](crate::FetchCache)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries younger than this are served with no network activity
    pub fresh_window: Duration,
    /// Entries younger than this (but past `fresh_window`) are served while a
    /// background revalidation runs. Older entries are misses.
    pub stale_window: Duration,
    /// Capacity; least recently used entries are evicted beyond it
    pub max_entries: usize,
    /// Upper bound on a single upstream fetch
    pub fetch_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fresh_window: DEFAULT_FRESH_WINDOW,
            stale_window: DEFAULT_STALE_WINDOW,
            max_entries: DEFAULT_MAX_ENTRIES,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl CacheConfig {
    /// Check that the stale-but-serve state is reachable and capacity is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fresh_window >= self.stale_window {
            return Err(ConfigError::WindowOrder {
                fresh: self.fresh_window,
                stale: self.stale_window,
            });
        }
        if self.max_entries == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
