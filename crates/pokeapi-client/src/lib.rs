//! Typed client for [PokeAPI](https://pokeapi.co/)
//!
//! All requests read through a shared [`fetch_cache::FetchCache`], so repeated
//! lookups of the same Pokemon within the fresh window cost nothing and
//! concurrent lookups share one network call.
//!
//! # Example
//!
//! ```no_run
//! use fetch_cache::{CacheConfig, FetchCache};
//! use pokeapi_client::PokeApiClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = FetchCache::new(CacheConfig::default())?;
//! let client = PokeApiClient::new(cache)?;
//!
//! let pikachu = client.get_pokemon("pikachu").await?;
//! println!("{} has BST {}", pikachu.name, pikachu.base_stat_total());
//!
//! let species = client.get_species(pikachu.id).await?;
//! if let Some(chain) = &species.evolution_chain {
//!     let chain = client.get_evolution_chain(&chain.url).await?;
//!     println!("Chain starts at {}", chain.chain.species.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Endpoints
//!
//! - `GET /pokemon/{name_or_id}`
//! - `GET /pokemon-species/{id}`
//! - `GET /evolution-chain/{id}` (by URL from the species)

mod client;
mod error;
mod types;

pub use client::{PokeApiClient, PokeCache};
pub use error::{PokeApiError, Result};
pub use types::{
    AbilityEntry, ApiResource, Artwork, ChainLink, EvolutionChain, FlavorTextEntry, MoveEntry,
    MoveLearnDetail, NamedResource, OtherSprites, Pokemon, Species, Sprites, StatEntry, TypeEntry,
};
