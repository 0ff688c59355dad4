pub mod cache;
pub mod daily;
pub mod health;
pub mod pages;
pub mod pokemon;

use axum::http::{HeaderName, HeaderValue};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use fetch_cache::CacheStatus;
use tower_http::trace::TraceLayer;

use crate::guard::route_guard;
use crate::state::AppState;

pub(crate) const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Create the HTTP router
///
/// The route guard wraps every route, including the 404 fallback.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health))
        // PokeAPI (cached)
        .route("/api/pokemon/{name_or_id}", get(pokemon::get_pokemon))
        .route("/api/pokemon/{name_or_id}/hints", get(pokemon::get_hints))
        .route("/api/species/{id}", get(pokemon::get_species))
        // Daily challenge
        .route("/api/daily", get(daily::get_daily))
        // Cache maintenance
        .route("/api/cache/stats", get(cache::stats))
        .route("/api/cache/clear", post(cache::clear))
        // Pages
        .route("/profile", get(pages::profile))
        .route("/stats", get(pages::stats))
        .route("/auth/sign-in", get(pages::sign_in))
        .route("/auth/callback", get(pages::auth_callback))
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Attach an `X-Cache: HIT | STALE | MISS` header
pub(crate) fn with_cache_status(status: CacheStatus, body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    response
        .headers_mut()
        .insert(X_CACHE, HeaderValue::from_static(status.as_header_value()));
    response
}
