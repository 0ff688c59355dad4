//! Who's That Pokemon? edge server
//!
//! Guards the signed-in pages, refreshes sessions, and serves a cached JSON
//! view of PokeAPI plus the daily challenge.

mod config;
mod error;
mod guard;
mod routes;
mod session;
mod state;

use std::sync::Arc;

use axum::http::{header, Method};
use fetch_cache::FetchCache;
use pokeapi_client::PokeApiClient;
use route_guard::RouteGuard;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

use config::Config;
use session::NoopRefresher;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("whosthat_server=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let config = Config::from_env();
    info!(port = config.port, "Starting whosthat-server");
    info!(
        fresh_secs = config.cache.fresh_window.as_secs(),
        stale_secs = config.cache.stale_window.as_secs(),
        max_entries = config.cache.max_entries,
        "Cache configuration"
    );
    if config.internal_secret.is_none() {
        warn!("INTERNAL_SECRET not set, cache maintenance endpoints are disabled");
    }
    if config.guard.session_cookie.is_none() {
        warn!("SUPABASE_URL not set or unrecognised, relying on fallback session cookies");
    }

    let cache = FetchCache::new(config.cache.clone())?;
    let pruner = cache.spawn_pruner(config.prune_interval);
    let pokeapi = PokeApiClient::with_base_url(
        &config.pokeapi_base_url,
        cache,
        config.cache.fetch_timeout,
    )?;

    let state = AppState::new(
        pokeapi,
        RouteGuard::new(config.guard.clone()),
        Arc::new(NoopRefresher),
    )
    .with_internal_secret(config.internal_secret.clone());

    // CORS
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::COOKIE])
            .allow_credentials(true)
    };

    let app = routes::create_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!(port = config.port, "Listening");

    axum::serve(listener, app).await?;

    pruner.abort();
    Ok(())
}
