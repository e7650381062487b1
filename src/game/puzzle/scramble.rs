use std::time::Duration;

use rand::seq::SliceRandom;

use crate::game::achievement::Achievement;
use crate::game::puzzle::{normalize_answer, retry_state, PuzzleRules};
use crate::game::types::{PuzzleState, ValidationResult};

/// Unscramble the letters back into the hidden word.
#[derive(Debug, Clone)]
pub struct WordScramble {
    pub scrambled: String,
    answer: String,
}

impl WordScramble {
    pub fn new(scrambled: &str, answer: &str) -> Self {
        Self {
            scrambled: scrambled.trim().to_string(),
            answer: normalize_answer(answer),
        }
    }

    /// Build a scramble by shuffling the answer's letters.
    pub fn from_answer(answer: &str) -> Self {
        let word = answer.trim();
        let mut letters: Vec<char> = word.chars().collect();
        let mut rng = rand::thread_rng();
        for _ in 0..8 {
            letters.shuffle(&mut rng);
            if letters.iter().collect::<String>() != word {
                break;
            }
        }
        if letters.len() > 1 && letters.iter().collect::<String>() == word {
            letters.rotate_left(1);
        }
        Self::new(&letters.into_iter().collect::<String>(), word)
    }
}

impl PuzzleRules for WordScramble {
    fn evaluate(&mut self, input: &str, state: PuzzleState) -> ValidationResult {
        let guess = normalize_answer(input);
        if guess.is_empty() {
            return ValidationResult::rejected("Type the unscrambled word.", retry_state(state));
        }
        if guess == self.answer {
            ValidationResult::accepted("The letters fall into place.", PuzzleState::Solved)
        } else {
            ValidationResult::rejected(
                format!("'{}' is not the hidden word.", input.trim()),
                retry_state(state),
            )
        }
    }

    fn question(&self) -> String {
        format!("Unscramble: {}", self.scrambled)
    }

    fn achievement_met(
        &self,
        achievement: &Achievement,
        elapsed: Duration,
        hints_used: u32,
        _score: u64,
    ) -> bool {
        hints_used == 0 && achievement.within_time_limit(elapsed.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(s: &str) -> Vec<char> {
        let mut chars: Vec<char> = s.to_lowercase().chars().collect();
        chars.sort_unstable();
        chars
    }

    #[test]
    fn shuffled_scramble_keeps_letters_and_differs() {
        let scramble = WordScramble::from_answer("lantern");
        assert_eq!(sorted(&scramble.scrambled), sorted("lantern"));
        assert_ne!(scramble.scrambled, "lantern");
    }

    #[test]
    fn solving_scramble() {
        let mut scramble = WordScramble::new("nrtnael", "Lantern");
        let wrong = scramble.evaluate("rental", PuzzleState::Init);
        assert!(!wrong.valid);
        assert!(wrong.message.contains("rental"));
        let right = scramble.evaluate("LANTERN", PuzzleState::InProgress);
        assert!(right.valid);
        assert_eq!(right.new_state, PuzzleState::Solved);
        assert_eq!(scramble.question(), "Unscramble: nrtnael");
    }
}
