use std::collections::BTreeSet;
use std::time::Duration;

use crate::game::achievement::Achievement;
use crate::game::puzzle::{normalize_answer, retry_state, PuzzleRules};
use crate::game::types::{PuzzleState, ValidationResult};

/// Code accepted by a code puzzle that was not configured with its own codes.
pub const DEFAULT_CODE: &str = "victory";

/// Door-code style puzzle: any of a set of codes opens it.
#[derive(Debug, Clone)]
pub struct CodePuzzle {
    pub prompt: String,
    codes: BTreeSet<String>,
}

impl Default for CodePuzzle {
    fn default() -> Self {
        Self::new("Enter the code.")
    }
}

impl CodePuzzle {
    pub fn new(prompt: &str) -> Self {
        let mut codes = BTreeSet::new();
        codes.insert(DEFAULT_CODE.to_string());
        Self {
            prompt: prompt.to_string(),
            codes,
        }
    }

    /// Replace the accepted set with `codes`. Blank codes are ignored; an empty
    /// result keeps the default code.
    pub fn with_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let accepted: BTreeSet<String> = codes
            .into_iter()
            .map(|c| normalize_answer(c.as_ref()))
            .filter(|c| !c.is_empty())
            .collect();
        if !accepted.is_empty() {
            self.codes = accepted;
        }
        self
    }

    /// Accept one more code. Returns false for blank or duplicate codes.
    pub fn add_code(&mut self, code: &str) -> bool {
        let code = normalize_answer(code);
        if code.is_empty() {
            return false;
        }
        self.codes.insert(code)
    }

    pub fn accepts(&self, input: &str) -> bool {
        self.codes.contains(&normalize_answer(input))
    }

    pub fn code_count(&self) -> usize {
        self.codes.len()
    }
}

impl PuzzleRules for CodePuzzle {
    fn evaluate(&mut self, input: &str, state: PuzzleState) -> ValidationResult {
        if input.trim().is_empty() {
            return ValidationResult::rejected("Enter a code to try the lock.", retry_state(state));
        }
        if self.accepts(input) {
            ValidationResult::accepted("The lock clicks open.", PuzzleState::Solved)
        } else {
            ValidationResult::rejected("That code does not work.", retry_state(state))
        }
    }

    fn question(&self) -> String {
        self.prompt.clone()
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
    use crate::game::puzzle::{Puzzle, PuzzleKind};

    fn puzzle() -> Puzzle {
        Puzzle::new("c1", "Vault", PuzzleKind::Code(CodePuzzle::default()))
    }

    #[test]
    fn default_code_variants_all_solve() {
        for input in ["VICTORY", " victory ", "Victory"] {
            let mut p = puzzle();
            let result = p.enter_input(input);
            assert!(result.valid, "{input:?} should solve");
            assert_eq!(p.state(), PuzzleState::Solved);
        }
    }

    #[test]
    fn empty_input_is_invalid_and_unsolved() {
        let mut p = puzzle();
        let result = p.enter_input("");
        assert!(!result.valid);
        assert!(!p.is_solved());
        assert_eq!(result.new_state, PuzzleState::InProgress);
    }

    #[test]
    fn added_codes_are_accepted() {
        let mut code = CodePuzzle::new("Dial");
        assert!(code.add_code(" Open Sesame "));
        assert!(!code.add_code("open sesame"));
        assert!(!code.add_code("   "));
        assert!(code.accepts("OPEN SESAME"));
        assert!(code.accepts("victory"));
        assert_eq!(code.code_count(), 2);
    }

    #[test]
    fn configured_codes_replace_default() {
        let code = CodePuzzle::new("Dial").with_codes(["1234", "4321"]);
        assert!(code.accepts("1234"));
        assert!(!code.accepts("victory"));

        let fallback = CodePuzzle::new("Dial").with_codes(Vec::<String>::new());
        assert!(fallback.accepts("victory"));
    }

    #[test]
    fn achievement_needs_zero_hints_within_ceiling() {
        let code = CodePuzzle::default();
        let ach = Achievement::new("a", "A", "", "d", "c1").with_time_limit_ms(10_000);
        assert!(code.achievement_met(&ach, Duration::from_secs(5), 0, 0));
        assert!(!code.achievement_met(&ach, Duration::from_secs(5), 1, 0));
        assert!(!code.achievement_met(&ach, Duration::from_secs(11), 0, 0));
    }
}
