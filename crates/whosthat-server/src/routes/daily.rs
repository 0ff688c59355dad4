use axum::extract::State;
use axum::Json;
use chrono::Utc;
use whosthat_game::DailyChallenge;

use crate::state::AppState;

/// GET /api/daily
///
/// Also warms the cache with today's Pokemon so the hints request that
/// follows is served from memory.
pub async fn get_daily(State(state): State<AppState>) -> Json<DailyChallenge> {
    let challenge = DailyChallenge::at(Utc::now());
    state.pokeapi.prefetch_bundle(challenge.pokemon_id);
    Json(challenge)
}
