//! Hints revealed as the player guesses

use pokeapi_client::{Pokemon, Species};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single clue about the mystery Pokemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum HintType {
    Bst,
    Region,
    Ability,
    Types,
    Cry,
    Silhouette,
}

/// Order in which hints are revealed, one per wrong guess
pub const HINT_SEQUENCE: [HintType; 6] = [
    HintType::Bst,
    HintType::Region,
    HintType::Ability,
    HintType::Types,
    HintType::Cry,
    HintType::Silhouette,
];

/// One guess before any hints, then one per hint
pub const MAX_GUESSES: usize = HINT_SEQUENCE.len() + 1;

/// Hints visible after `guesses_made` wrong guesses
pub fn revealed_hints(guesses_made: usize) -> &'static [HintType] {
    &HINT_SEQUENCE[..guesses_made.min(HINT_SEQUENCE.len())]
}

const CRY_BASE_URL: &str = "https://play.pokemonshowdown.com/audio/cries";
const NO_ABILITY: &str = "—";
const REDACTED: &str = "???";

/// Everything a round needs, derived from PokeAPI data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PokemonHints {
    pub bst: u32,
    pub cry_url: String,
    pub region: String,
    pub ability: String,
    pub types: Vec<String>,
    pub silhouette_url: String,
    /// English Pokedex entry with the Pokemon's own name redacted
    pub pokedex_entry: String,
}

impl PokemonHints {
    pub fn from_api(pokemon: &Pokemon, species: &Species) -> Self {
        let ability = pokemon
            .abilities
            .iter()
            .min_by_key(|a| a.slot)
            .map(|a| a.ability.name.clone())
            .unwrap_or_else(|| NO_ABILITY.to_string());

        let pokedex_entry = species
            .flavor_text("en")
            .map(|text| redact_name(&normalize_flavor_text(text), &pokemon.name))
            .unwrap_or_default();

        Self {
            bst: pokemon.base_stat_total(),
            cry_url: cry_url(&pokemon.name),
            region: region_for_generation(&species.generation.name).to_string(),
            ability,
            types: pokemon.type_names(),
            silhouette_url: pokemon
                .sprites
                .official_artwork()
                .unwrap_or_default()
                .to_string(),
            pokedex_entry,
        }
    }

    /// Value shown for one hint
    pub fn describe(&self, hint: HintType) -> String {
        match hint {
            HintType::Bst => self.bst.to_string(),
            HintType::Region => self.region.clone(),
            HintType::Ability => self.ability.clone(),
            HintType::Types => self.types.join(" / "),
            HintType::Cry => self.cry_url.clone(),
            HintType::Silhouette => self.silhouette_url.clone(),
        }
    }
}

pub fn cry_url(name: &str) -> String {
    format!("{CRY_BASE_URL}/{name}.mp3")
}

/// Region name for a PokeAPI generation (`generation-i` is Kanto).
/// Unknown generations are returned unchanged.
pub fn region_for_generation(generation: &str) -> &str {
    match generation {
        "generation-i" => "Kanto",
        "generation-ii" => "Johto",
        "generation-iii" => "Hoenn",
        "generation-iv" => "Sinnoh",
        "generation-v" => "Unova",
        "generation-vi" => "Kalos",
        "generation-vii" => "Alola",
        "generation-viii" => "Galar",
        "generation-ix" => "Paldea",
        other => other,
    }
}

/// PokeAPI flavor text keeps the game's line and page breaks
fn normalize_flavor_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn redact_name(text: &str, name: &str) -> String {
    if name.is_empty() {
        return text.to_string();
    }
    match RegexBuilder::new(&regex::escape(name))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.replace_all(text, REDACTED).into_owned(),
        Err(_) => text.to_string(),
    }
}
