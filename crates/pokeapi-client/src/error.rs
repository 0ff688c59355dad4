use std::sync::Arc;
use std::time::Duration;

use fetch_cache::CacheError;

/// Errors from the PokeAPI client
///
/// Clonable so a single upstream failure can be handed to every caller that
/// was waiting on the same request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PokeApiError {
    /// Non-2xx response
    #[error("PokeAPI error ({status}): {reason}")]
    Status { status: u16, reason: String },
    /// Connection, TLS or body transfer failure
    #[error("HTTP error: {0}")]
    Http(Arc<reqwest::Error>),
    /// Response body was not the expected JSON shape
    #[error("Invalid response from {url}: {source}")]
    Json {
        url: String,
        source: Arc<serde_json::Error>,
    },
    #[error("PokeAPI request for {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },
    /// Cache-level failure that never reached the network layer
    #[error("Cache error: {0}")]
    Cache(String),
}

impl PokeApiError {
    /// HTTP status of an upstream rejection, if that is what this is
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for PokeApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Arc::new(err))
    }
}

impl From<CacheError<PokeApiError>> for PokeApiError {
    fn from(err: CacheError<PokeApiError>) -> Self {
        match err {
            CacheError::Fetch(inner) => (*inner).clone(),
            CacheError::Timeout { key, after } => Self::Timeout { url: key, after },
            other @ (CacheError::TypeMismatch { .. } | CacheError::Aborted { .. }) => {
                Self::Cache(other.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PokeApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = PokeApiError::Status {
            status: 404,
            reason: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "PokeAPI error (404): Not Found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_cache_error_unwraps_upstream() {
        let upstream = PokeApiError::Status {
            status: 500,
            reason: "Internal Server Error".into(),
        };
        let err: PokeApiError = CacheError::Fetch(Arc::new(upstream)).into();
        assert_eq!(err.status(), Some(500));

        let err: PokeApiError = CacheError::<PokeApiError>::Timeout {
            key: "https://pokeapi.co/api/v2/pokemon/25".into(),
            after: Duration::from_secs(30),
        }
        .into();
        assert!(matches!(err, PokeApiError::Timeout { .. }));

        let err: PokeApiError = CacheError::<PokeApiError>::TypeMismatch { key: "k".into() }.into();
        assert!(matches!(err, PokeApiError::Cache(_)));
    }
}
