use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use fetch_cache::CacheStats;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::AppError;
use crate::state::AppState;

pub(crate) const INTERNAL_SECRET_HEADER: &str = "x-internal-secret";

/// GET /api/cache/stats
pub async fn stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.pokeapi.cache_stats())
}

/// POST /api/cache/clear
///
/// Requires `X-Internal-Secret` to match the configured secret.
pub async fn clear(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let presented = headers
        .get(INTERNAL_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    let authorized = match (state.internal_secret.as_deref(), presented) {
        (Some(expected), Some(presented)) => expected == presented,
        _ => false,
    };
    if !authorized {
        warn!("Rejected cache clear without a valid internal secret");
        return Err(AppError::Forbidden("Forbidden".into()));
    }

    let cleared = state.pokeapi.cache().len();
    state.pokeapi.clear_cache();
    info!(cleared, "Cache cleared on request");
    Ok(Json(json!({ "cleared": cleared })))
}
