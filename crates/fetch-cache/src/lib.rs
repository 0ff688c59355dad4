//! Read-through fetch cache
//!
//! Sits in front of a slow or rate-limited read-only API and serves recent
//! responses from memory. Each key goes through three states as it ages:
//!
//! - **fresh**: returned without any network activity
//! - **stale**: returned immediately while one background revalidation runs
//! - **expired**: treated as a miss and purged
//!
//! Concurrent requests for the same key share a single network call, and the
//! cache holds at most `max_entries` values, evicting the least recently used.
//!
//! # Example
//!
//! ```no_run
//! use fetch_cache::{CacheConfig, FetchCache, GetOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache: FetchCache<std::io::Error> = FetchCache::new(CacheConfig::default())?;
//!
//! let value = cache
//!     .get(
//!         "https://pokeapi.co/api/v2/pokemon/25",
//!         || async { Ok::<_, std::io::Error>("pikachu".to_string()) },
//!         GetOptions::default(),
//!     )
//!     .await?;
//! assert_eq!(value.as_str(), "pikachu");
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod error;
mod types;

pub use cache::FetchCache;
pub use config::CacheConfig;
pub use error::{CacheError, ConfigError};
pub use types::{CacheStats, CacheStatus, GetOptions};
