//! Public value types

use serde::Serialize;

/// Per-call options for [`FetchCache::get`](crate::FetchCache::get)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Skip the cache lookup and go to the network (still de-duplicated)
    pub force: bool,
}

impl GetOptions {
    pub fn force() -> Self {
        Self { force: true }
    }
}

/// How a value was served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Within the fresh window, no network activity
    Fresh,
    /// Past the fresh window; a background revalidation was started or is running
    Stale,
    /// Fetched from upstream (or joined an in-flight fetch)
    Miss,
}

impl CacheStatus {
    /// Value for an `X-Cache` response header
    pub fn as_header_value(&self) -> &'static str {
        match self {
            Self::Fresh => "HIT",
            Self::Stale => "STALE",
            Self::Miss => "MISS",
        }
    }
}

/// Snapshot of cache occupancy and counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    /// Keys ordered from most to least recently used
    pub keys: Vec<String>,
    pub in_flight: usize,
    pub fresh_hits: u64,
    pub stale_hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub revalidations: u64,
    pub revalidation_failures: u64,
}
