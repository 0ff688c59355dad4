use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use fetch_cache::CacheStatus;
use whosthat_game::PokemonHints;

use crate::error::AppError;
use crate::routes::with_cache_status;
use crate::state::AppState;

const MAX_NAME_LEN: usize = 64;

/// GET /api/pokemon/{name_or_id}
pub async fn get_pokemon(
    State(state): State<AppState>,
    Path(name_or_id): Path<String>,
) -> Result<Response, AppError> {
    validate_name_or_id(&name_or_id)?;
    let (pokemon, status) = state.pokeapi.get_pokemon_with_status(&name_or_id).await?;
    Ok(with_cache_status(status, Json(&*pokemon)))
}

/// GET /api/pokemon/{name_or_id}/hints
pub async fn get_hints(
    State(state): State<AppState>,
    Path(name_or_id): Path<String>,
) -> Result<Response, AppError> {
    validate_name_or_id(&name_or_id)?;
    let (pokemon, pokemon_status) = state.pokeapi.get_pokemon_with_status(&name_or_id).await?;
    let (species, species_status) = state.pokeapi.get_species_with_status(pokemon.id).await?;

    let hints = PokemonHints::from_api(&pokemon, &species);
    Ok(with_cache_status(
        least_cached(pokemon_status, species_status),
        Json(hints),
    ))
}

/// GET /api/species/{id}
pub async fn get_species(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Response, AppError> {
    let (species, status) = state.pokeapi.get_species_with_status(id).await?;
    Ok(with_cache_status(status, Json(&*species)))
}

fn validate_name_or_id(name_or_id: &str) -> Result<(), AppError> {
    let valid = !name_or_id.is_empty()
        && name_or_id.len() <= MAX_NAME_LEN
        && name_or_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid Pokemon name or id".into()))
    }
}

/// Report the weaker of two statuses for a response built from both
fn least_cached(a: CacheStatus, b: CacheStatus) -> CacheStatus {
    use CacheStatus::*;
    match (a, b) {
        (Miss, _) | (_, Miss) => Miss,
        (Stale, _) | (_, Stale) => Stale,
        _ => Fresh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_or_id() {
        assert!(validate_name_or_id("25").is_ok());
        assert!(validate_name_or_id("Mr.Mime").is_ok());
        assert!(validate_name_or_id("ho-oh").is_ok());
        assert!(validate_name_or_id("").is_err());
        assert!(validate_name_or_id("../admin").is_err());
        assert!(validate_name_or_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_least_cached() {
        use CacheStatus::*;
        assert_eq!(least_cached(Fresh, Fresh), Fresh);
        assert_eq!(least_cached(Fresh, Stale), Stale);
        assert_eq!(least_cached(Stale, Miss), Miss);
    }
}
