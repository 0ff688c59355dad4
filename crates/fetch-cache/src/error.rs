//! Error types for the fetch cache

use std::sync::Arc;
use std::time::Duration;

/// Invalid [`CacheConfig`](crate::CacheConfig)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("fresh window ({fresh:?}) must be shorter than stale window ({stale:?})")]
    WindowOrder { fresh: Duration, stale: Duration },
    #[error("max_entries must be at least 1")]
    ZeroCapacity,
    #[error("fetch timeout must be non-zero")]
    ZeroTimeout,
}

/// Errors returned by [`FetchCache::get`](crate::FetchCache::get)
///
/// Upstream errors are shared between every caller that waited on the same
/// in-flight request, hence the `Arc`.
#[derive(Debug, thiserror::Error)]
pub enum CacheError<E> {
    /// The fetcher itself failed
    #[error("{0}")]
    Fetch(Arc<E>),
    /// The fetch did not settle within the configured timeout
    #[error("fetch for {key} timed out after {after:?}")]
    Timeout { key: String, after: Duration },
    /// The key holds a value of a different type than the one requested
    #[error("cached value for {key} has a different type")]
    TypeMismatch { key: String },
    /// The fetch task panicked or was aborted before settling
    #[error("fetch for {key} was aborted")]
    Aborted { key: String },
}

impl<E> CacheError<E> {
    /// The upstream error, if this failure came from the fetcher
    pub fn upstream(&self) -> Option<&E> {
        match self {
            Self::Fetch(e) => Some(e),
            _ => None,
        }
    }
}

// Manual impl: `Arc<E>` is clonable whether or not `E` is.
impl<E> Clone for CacheError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Fetch(e) => Self::Fetch(Arc::clone(e)),
            Self::Timeout { key, after } => Self::Timeout {
                key: key.clone(),
                after: *after,
            },
            Self::TypeMismatch { key } => Self::TypeMismatch { key: key.clone() },
            Self::Aborted { key } => Self::Aborted { key: key.clone() },
        }
    }
}
