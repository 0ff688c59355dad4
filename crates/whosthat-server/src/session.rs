//! Session refresh stage
//!
//! Runs after the route guard allows a request. The auth backend's SDK owns
//! token rotation; this seam lets it hand back replacement cookies that are
//! written onto the response.

use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, CookieJar};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session refresh failed: {0}")]
    Refresh(String),
}

/// Refreshes the visitor's session, if it has one
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    /// Cookies to set on the response. An empty list means nothing changed.
    async fn refresh(&self, cookies: &CookieJar) -> Result<Vec<Cookie<'static>>, SessionError>;
}

/// Refresher that never changes anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRefresher;

#[async_trait]
impl SessionRefresher for NoopRefresher {
    async fn refresh(&self, _cookies: &CookieJar) -> Result<Vec<Cookie<'static>>, SessionError> {
        Ok(Vec::new())
    }
}
