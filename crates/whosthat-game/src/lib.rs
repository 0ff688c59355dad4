//! Game rules for Who's That Pokemon?
//!
//! - [`daily`]: which Pokemon is today's challenge, and when the next one starts
//! - [`hints`]: the clues revealed after each wrong guess
//! - [`guess`]: typo-tolerant guess checking and round state
//!
//! Wire types derive [`ts_rs::TS`]; `cargo test` writes their TypeScript
//! definitions to `bindings/`.

pub mod daily;
pub mod guess;
pub mod hints;

pub use daily::{
    challenge_date_key, daily_pokemon_id, next_rollover, time_until_next_challenge, Countdown,
    DailyChallenge, POKEDEX_SIZE, ROLLOVER_HOUR_ET,
};
pub use guess::{is_close_match, GuessOutcome, Round, MATCH_THRESHOLD};
pub use hints::{
    cry_url, region_for_generation, revealed_hints, HintType, PokemonHints, HINT_SEQUENCE,
    MAX_GUESSES,
};
