//! Guess checking and per-round state

use crate::hints::{revealed_hints, HintType, MAX_GUESSES};

/// Minimum normalized Levenshtein similarity for a guess to count
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Whether `guess` is close enough to `target` to count as correct
///
/// Case and surrounding whitespace are ignored. Small typos still match:
/// `"pikachoo"` is accepted for `"pikachu"`, `"raichu"` is not.
pub fn is_close_match(guess: &str, target: &str) -> bool {
    let guess = guess.trim().to_lowercase();
    let target = target.trim().to_lowercase();
    if guess.is_empty() || target.is_empty() {
        return false;
    }
    strsim::normalized_levenshtein(&guess, &target) >= MATCH_THRESHOLD
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    Incorrect,
    /// The round was already won or out of guesses; nothing was counted
    RoundOver,
}

/// One round against a single mystery Pokemon
#[derive(Debug, Clone)]
pub struct Round {
    target: String,
    guesses_made: usize,
    won: bool,
}

impl Round {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into().to_lowercase(),
            guesses_made: 0,
            won: false,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Submit a guess. Every accepted guess counts, including the winning one.
    pub fn guess(&mut self, guess: &str) -> GuessOutcome {
        if self.is_over() {
            return GuessOutcome::RoundOver;
        }

        self.guesses_made += 1;
        if is_close_match(guess, &self.target) {
            self.won = true;
            GuessOutcome::Correct
        } else {
            GuessOutcome::Incorrect
        }
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn guesses_made(&self) -> usize {
        self.guesses_made
    }

    pub fn guesses_left(&self) -> usize {
        MAX_GUESSES.saturating_sub(self.guesses_made)
    }

    pub fn is_over(&self) -> bool {
        self.won || self.guesses_made >= MAX_GUESSES
    }

    /// Hints on show, one per guess made
    pub fn revealed(&self) -> &'static [HintType] {
        revealed_hints(self.guesses_made)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(is_close_match("pikachu", "pikachu"));
        assert!(is_close_match("  Pikachu ", "pikachu"));
        assert!(is_close_match("MR-MIME", "mr-mime"));
    }

    #[test]
    fn test_near_miss_matches() {
        assert!(is_close_match("pikachoo", "pikachu"));
        assert!(is_close_match("pikchu", "pikachu"));
        assert!(is_close_match("charmandr", "charmander"));
        assert!(is_close_match("mr mime", "mr-mime"));
    }

    #[test]
    fn test_far_miss_rejected() {
        assert!(!is_close_match("raichu", "pikachu"));
        assert!(!is_close_match("bulbasaur", "pikachu"));
        assert!(!is_close_match("charizard", "charmander"));
        assert!(!is_close_match("pika", "pikachu"));
    }

    #[test]
    fn test_blank_guess_never_matches() {
        assert!(!is_close_match("", "pikachu"));
        assert!(!is_close_match("   ", "pikachu"));
        assert!(!is_close_match("pikachu", ""));
    }

    #[test]
    fn test_round_win_counts_winning_guess() {
        let mut round = Round::new("Pikachu");
        assert_eq!(round.target(), "pikachu");

        assert_eq!(round.guess("raichu"), GuessOutcome::Incorrect);
        assert_eq!(round.revealed(), &[HintType::Bst]);
        assert_eq!(round.guess("PIKACHU"), GuessOutcome::Correct);

        assert!(round.won());
        assert!(round.is_over());
        assert_eq!(round.guesses_made(), 2);

        // Further guesses are refused and not counted
        assert_eq!(round.guess("pikachu"), GuessOutcome::RoundOver);
        assert_eq!(round.guesses_made(), 2);
    }

    #[test]
    fn test_round_capped_at_max_guesses() {
        let mut round = Round::new("pikachu");
        for i in 0..MAX_GUESSES {
            assert_eq!(round.guesses_left(), MAX_GUESSES - i);
            assert_eq!(round.guess("bulbasaur"), GuessOutcome::Incorrect);
        }

        assert_eq!(round.guesses_made(), 7);
        assert_eq!(round.guesses_left(), 0);
        assert!(round.is_over());
        assert!(!round.won());
        assert_eq!(round.revealed().len(), 6);

        // Even a correct guess is refused once out of guesses
        assert_eq!(round.guess("pikachu"), GuessOutcome::RoundOver);
        assert_eq!(round.guesses_made(), 7);
        assert!(!round.won());
    }
}
