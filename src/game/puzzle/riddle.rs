use std::time::Duration;

use crate::game::achievement::Achievement;
use crate::game::puzzle::{normalize_answer, retry_state, PuzzleRules};
use crate::game::types::{PuzzleState, ValidationResult};

/// Question with exactly one accepted answer.
#[derive(Debug, Clone)]
pub struct Riddle {
    pub question: String,
    answer: String,
}

impl Riddle {
    pub fn new(question: &str, answer: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: normalize_answer(answer),
        }
    }
}

impl PuzzleRules for Riddle {
    fn evaluate(&mut self, input: &str, state: PuzzleState) -> ValidationResult {
        let guess = normalize_answer(input);
        if guess.is_empty() {
            return ValidationResult::rejected("Say something to answer the riddle.", retry_state(state));
        }
        if guess == self.answer {
            ValidationResult::accepted("Correct! The riddle is solved.", PuzzleState::Solved)
        } else {
            ValidationResult::rejected("That is not the answer.", retry_state(state))
        }
    }

    fn question(&self) -> String {
        self.question.clone()
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
