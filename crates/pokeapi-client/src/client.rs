//! PokeAPI HTTP client

use std::sync::Arc;
use std::time::Duration;

use fetch_cache::{CacheStats, CacheStatus, FetchCache, GetOptions};
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{PokeApiError, Result};
use crate::types::{EvolutionChain, Pokemon, Species};

/// Cache shared by every [`PokeApiClient`] in the process
pub type PokeCache = FetchCache<PokeApiError>;

const DEFAULT_USER_AGENT: &str = "whosthat-pokeapi-client/0.1";

/// Client for the read-only PokeAPI
///
/// Every request goes through the shared [`PokeCache`], keyed by the
/// fully-qualified request URL. Cloning is cheap and clones share the cache.
#[derive(Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
    cache: PokeCache,
}

impl PokeApiClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://pokeapi.co/api/v2";

    /// Create a client against the public PokeAPI (30 second timeout)
    pub fn new(cache: PokeCache) -> Result<Self> {
        Self::with_base_url(Self::DEFAULT_BASE_URL, cache, Duration::from_secs(30))
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(base_url: &str, cache: PokeCache, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &PokeCache {
        &self.cache
    }

    /// Cache key and request URL for a Pokemon. Names are case-insensitive
    /// upstream, so they are lowercased to keep one entry per Pokemon.
    pub fn pokemon_url(&self, name_or_id: &str) -> String {
        format!(
            "{}/pokemon/{}",
            self.base_url,
            urlencoding::encode(&name_or_id.trim().to_lowercase())
        )
    }

    pub fn species_url(&self, id: u32) -> String {
        format!("{}/pokemon-species/{}", self.base_url, id)
    }

    /// Main Pokemon data (stats, types, abilities, sprites) by name or id
    pub async fn get_pokemon(&self, name_or_id: &str) -> Result<Arc<Pokemon>> {
        self.get_pokemon_with_status(name_or_id)
            .await
            .map(|(p, _)| p)
    }

    pub async fn get_pokemon_with_status(
        &self,
        name_or_id: &str,
    ) -> Result<(Arc<Pokemon>, CacheStatus)> {
        self.fetch(self.pokemon_url(name_or_id), GetOptions::default())
            .await
    }

    /// Like [`get_pokemon`](Self::get_pokemon), but always goes to the network
    pub async fn get_pokemon_fresh(&self, name_or_id: &str) -> Result<Arc<Pokemon>> {
        self.fetch(self.pokemon_url(name_or_id), GetOptions::force())
            .await
            .map(|(p, _)| p)
    }

    /// Species metadata (generation, flavor text, evolution chain URL)
    pub async fn get_species(&self, id: u32) -> Result<Arc<Species>> {
        self.get_species_with_status(id).await.map(|(s, _)| s)
    }

    pub async fn get_species_with_status(&self, id: u32) -> Result<(Arc<Species>, CacheStatus)> {
        self.fetch(self.species_url(id), GetOptions::default())
            .await
    }

    /// Evolution chain by the URL found in [`Species::evolution_chain`]
    pub async fn get_evolution_chain(&self, url: &str) -> Result<Arc<EvolutionChain>> {
        self.fetch(url.to_string(), GetOptions::default())
            .await
            .map(|(c, _)| c)
    }

    /// Warm the cache with a Pokemon, its species and its evolution chain
    ///
    /// Runs in the background; failures are logged and otherwise ignored.
    pub fn prefetch_bundle(&self, id: u32) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            let key = id.to_string();
            let (pokemon, chain) = tokio::join!(client.get_pokemon(&key), async {
                let species = client.get_species(id).await?;
                if let Some(ref chain) = species.evolution_chain {
                    client.get_evolution_chain(&chain.url).await?;
                }
                Ok::<_, PokeApiError>(())
            });

            if let Err(e) = pokemon {
                debug!(id, error = %e, "Prefetch of pokemon failed");
            }
            if let Err(e) = chain {
                debug!(id, error = %e, "Prefetch of species bundle failed");
            }
        })
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop entries past the stale window; returns how many were removed
    pub fn prune_cache(&self) -> usize {
        self.cache.prune()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn fetch<T>(&self, url: String, options: GetOptions) -> Result<(Arc<T>, CacheStatus)>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let http = self.http.clone();
        let request_url = url.clone();
        let result = self
            .cache
            .get_with_status(&url, move || fetch_json::<T>(http, request_url), options)
            .await?;
        Ok(result)
    }
}

impl std::fmt::Debug for PokeApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokeApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

async fn fetch_json<T: DeserializeOwned>(http: reqwest::Client, url: String) -> Result<T> {
    debug!(url = %url, "Fetching from PokeAPI");

    let response = http
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(PokeApiError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| PokeApiError::Json {
        url,
        source: Arc::new(e),
    })
}
