//! Route guard and session refresh as request middleware

use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use tracing::{debug, warn};

use crate::state::AppState;

/// Runs ahead of every handler
///
/// The guard decides first. Redirects end the request with a
/// `307 Temporary Redirect`. Allowed requests go through the session refresh
/// stage, whose cookies are appended to the handler's response; a failed
/// refresh is logged and the request continues.
pub async fn route_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let decision = state.guard.decide(
        request.uri().path(),
        request.uri().query().unwrap_or(""),
        jar.iter().map(|c| (c.name(), c.value())),
    );

    if let Some(location) = decision.location() {
        debug!(path = %request.uri().path(), location = %location, "Route guard redirect");
        return Redirect::temporary(&location).into_response();
    }

    let refreshed = match state.session.refresh(&jar).await {
        Ok(cookies) => cookies,
        Err(e) => {
            warn!(error = %e, "Session refresh failed, continuing");
            Vec::new()
        }
    };

    let mut response = next.run(request).await;
    for cookie in refreshed {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warn!(cookie = %cookie.name(), error = %e, "Dropping unencodable cookie"),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum_extra::extract::cookie::Cookie;
    use fetch_cache::{CacheConfig, FetchCache};
    use pokeapi_client::PokeApiClient;
    use route_guard::{GuardConfig, RouteGuard};
    use tower::ServiceExt;

    use crate::routes::create_router;
    use crate::session::{SessionError, SessionRefresher};
    use crate::state::AppState;

    const SESSION: &str = "sb-test-project-auth-token=test-token";

    /// Issues one rotated cookie and counts calls
    #[derive(Default)]
    struct RotatingRefresher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SessionRefresher for RotatingRefresher {
        async fn refresh(
            &self,
            _cookies: &axum_extra::extract::CookieJar,
        ) -> Result<Vec<Cookie<'static>>, SessionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Cookie::new("sb-test-project-auth-token", "rotated")])
        }
    }

    struct FailingRefresher;

    #[async_trait]
    impl SessionRefresher for FailingRefresher {
        async fn refresh(
            &self,
            _cookies: &axum_extra::extract::CookieJar,
        ) -> Result<Vec<Cookie<'static>>, SessionError> {
            Err(SessionError::Refresh("backend unreachable".into()))
        }
    }

    fn state(session: Arc<dyn SessionRefresher>) -> AppState {
        let cache = FetchCache::new(CacheConfig::default()).unwrap();
        let pokeapi =
            PokeApiClient::with_base_url("http://127.0.0.1:9", cache, Duration::from_secs(1))
                .unwrap();
        let guard = RouteGuard::new(GuardConfig::for_backend_url(Some(
            "https://test-project.supabase.co",
        )));
        AppState::new(pokeapi, guard, session)
    }

    async fn send(state: AppState, uri: &str, cookie: Option<&str>) -> axum::response::Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        create_router(state)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_protected_page_redirects_to_sign_in() {
        let refresher = Arc::new(RotatingRefresher::default());
        let response = send(state(refresher.clone()), "/profile?tab=settings", None).await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            location(&response),
            "/auth/sign-in?redirectTo=/profile%3Ftab%3Dsettings"
        );
        // Redirects never reach the refresh stage
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_unrouted_protected_path_still_guarded() {
        let s = state(Arc::new(RotatingRefresher::default()));
        let response = send(s, "/profile/settings", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            location(&response),
            "/auth/sign-in?redirectTo=/profile/settings"
        );
    }

    #[tokio::test]
    async fn test_session_allows_and_refreshes() {
        let refresher = Arc::new(RotatingRefresher::default());
        let response = send(state(refresher.clone()), "/stats", Some(SESSION)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("sb-test-project-auth-token=rotated"));
    }

    #[tokio::test]
    async fn test_refresh_failure_does_not_block() {
        let response = send(state(Arc::new(FailingRefresher)), "/profile", Some(SESSION)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_refresh_failure_does_not_override_redirect() {
        let response = send(state(Arc::new(FailingRefresher)), "/profile", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn test_signed_in_visitor_bounced_off_sign_in() {
        let s = state(Arc::new(RotatingRefresher::default()));
        let response = send(
            s.clone(),
            "/auth/sign-in?redirectTo=%2Fstats%3Ftab%3Doverview",
            Some(SESSION),
        )
        .await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/stats?tab=overview");

        let response = send(s, "/auth/sign-in?redirectTo=//evil.com", Some(SESSION)).await;
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_public_pages_and_callback_pass_through() {
        let s = state(Arc::new(RotatingRefresher::default()));
        for uri in ["/auth/sign-in", "/auth/callback?code=123", "/health"] {
            let response = send(s.clone(), uri, None).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }
}
