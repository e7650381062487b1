//! Puzzle state machine shared by every puzzle variant.
//!
//! A [`Puzzle`] carries the common bookkeeping (state, hints, reward and gating
//! configuration) and delegates input evaluation to its [`PuzzleKind`] through
//! the [`PuzzleRules`] trait. Dispatch is an exhaustive `match`, so adding a
//! variant is a compile error until every capability is provided.

pub mod code;
pub mod maze;
pub mod riddle;
pub mod scramble;
pub mod shape_match;
pub mod slide_shape;

use std::fmt;
use std::time::Duration;

use log::debug;

use crate::game::achievement::Achievement;
use crate::game::types::{Difficulty, Hint, ItemRequirement, PuzzleState, ValidationResult};
use crate::logutil::escape_log;

pub use code::CodePuzzle;
pub use maze::MazePuzzle;
pub use riddle::Riddle;
pub use scramble::WordScramble;
pub use shape_match::{ShapeMatchPuzzle, ShapeTarget};
pub use slide_shape::{SlideMove, SlideShapePuzzle};

/// Capabilities every puzzle variant provides.
pub trait PuzzleRules {
    /// Evaluate raw input given the current state and report the next state.
    fn evaluate(&mut self, input: &str, state: PuzzleState) -> ValidationResult;

    /// Prompt shown to the player.
    fn question(&self) -> String;

    /// Variant-specific achievement threshold. Only consulted for solved puzzles.
    fn achievement_met(
        &self,
        achievement: &Achievement,
        elapsed: Duration,
        hints_used: u32,
        score: u64,
    ) -> bool;

    /// Return variant-local progress (positions, move counters) to its initial layout.
    fn reset(&mut self) {}
}

/// Variant tag used by callers that dispatch by puzzle kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PuzzleType {
    Code,
    Riddle,
    WordScramble,
    ShapeMatch,
    SlideShape,
    Maze,
}

impl fmt::Display for PuzzleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PuzzleType::Code => "code puzzle",
            PuzzleType::Riddle => "riddle",
            PuzzleType::WordScramble => "word scramble",
            PuzzleType::ShapeMatch => "shape match puzzle",
            PuzzleType::SlideShape => "slide puzzle",
            PuzzleType::Maze => "maze",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub enum PuzzleKind {
    Code(CodePuzzle),
    Riddle(Riddle),
    WordScramble(WordScramble),
    ShapeMatch(ShapeMatchPuzzle),
    SlideShape(SlideShapePuzzle),
    Maze(MazePuzzle),
}

impl PuzzleKind {
    pub fn puzzle_type(&self) -> PuzzleType {
        match self {
            PuzzleKind::Code(_) => PuzzleType::Code,
            PuzzleKind::Riddle(_) => PuzzleType::Riddle,
            PuzzleKind::WordScramble(_) => PuzzleType::WordScramble,
            PuzzleKind::ShapeMatch(_) => PuzzleType::ShapeMatch,
            PuzzleKind::SlideShape(_) => PuzzleType::SlideShape,
            PuzzleKind::Maze(_) => PuzzleType::Maze,
        }
    }

    fn rules(&self) -> &dyn PuzzleRules {
        match self {
            PuzzleKind::Code(p) => p,
            PuzzleKind::Riddle(p) => p,
            PuzzleKind::WordScramble(p) => p,
            PuzzleKind::ShapeMatch(p) => p,
            PuzzleKind::SlideShape(p) => p,
            PuzzleKind::Maze(p) => p,
        }
    }

    fn rules_mut(&mut self) -> &mut dyn PuzzleRules {
        match self {
            PuzzleKind::Code(p) => p,
            PuzzleKind::Riddle(p) => p,
            PuzzleKind::WordScramble(p) => p,
            PuzzleKind::ShapeMatch(p) => p,
            PuzzleKind::SlideShape(p) => p,
            PuzzleKind::Maze(p) => p,
        }
    }
}

/// Default number of hints a puzzle hands out.
pub const DEFAULT_MAX_HINTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct Puzzle {
    pub id: String,
    pub title: String,
    state: PuzzleState,
    pub max_hints: u32,
    hints: Vec<Hint>,
    hints_used: u32,
    /// Suggested solve time; zero means unbounded.
    pub allowed_time_ms: u64,
    pub difficulty: Difficulty,
    /// Item granted to the inventory when the puzzle is first solved.
    pub reward_item: Option<String>,
    pub requirement: ItemRequirement,
    pub kind: PuzzleKind,
}

impl Puzzle {
    pub fn new(id: &str, title: &str, kind: PuzzleKind) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            state: PuzzleState::Init,
            max_hints: DEFAULT_MAX_HINTS,
            hints: Vec::new(),
            hints_used: 0,
            allowed_time_ms: 0,
            difficulty: Difficulty::Normal,
            reward_item: None,
            requirement: ItemRequirement::default(),
            kind,
        }
    }

    pub fn with_hint(mut self, hint: Hint) -> Self {
        self.hints.push(hint);
        self.hints.sort_by_key(|h| h.level);
        self
    }

    pub fn with_max_hints(mut self, max_hints: u32) -> Self {
        self.max_hints = max_hints;
        self
    }

    pub fn with_reward(mut self, item_key: &str) -> Self {
        self.reward_item = Some(item_key.to_string());
        self
    }

    pub fn requiring_item(mut self, item_key: &str) -> Self {
        self.requirement = ItemRequirement::item(item_key);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_allowed_time_ms(mut self, ms: u64) -> Self {
        self.allowed_time_ms = ms;
        self
    }

    pub fn state(&self) -> PuzzleState {
        self.state
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    pub fn puzzle_type(&self) -> PuzzleType {
        self.kind.puzzle_type()
    }

    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn hints_remaining(&self) -> u32 {
        let available = (self.hints.len() as u32).min(self.max_hints);
        available.saturating_sub(self.hints_used)
    }

    pub fn question(&self) -> String {
        self.kind.rules().question()
    }

    /// Feed raw player input to the puzzle. Never panics; a solved puzzle stays solved.
    pub fn enter_input(&mut self, raw: &str) -> ValidationResult {
        let previous = self.state;
        let mut result = self.kind.rules_mut().evaluate(raw, previous);
        if previous.is_solved() {
            result.new_state = PuzzleState::Solved;
        }
        self.state = result.new_state;
        debug!(
            "Puzzle {} input '{}': {} -> {} (valid: {})",
            self.id,
            escape_log(raw),
            previous,
            self.state,
            result.valid
        );
        result
    }

    /// Hand out the next hint in level order, if the hint budget allows.
    pub fn take_hint(&mut self) -> Option<Hint> {
        if self.hints_remaining() == 0 {
            return None;
        }
        let hint = self.hints.get(self.hints_used as usize)?.clone();
        self.hints_used += 1;
        Some(hint)
    }

    /// Whether `achievement` is earned by the current solve.
    pub fn check_achievement_condition(
        &self,
        achievement: &Achievement,
        elapsed: Duration,
        hints_used: u32,
        score: u64,
    ) -> bool {
        if !self.is_solved() || achievement.puzzle_id != self.id {
            return false;
        }
        self.kind
            .rules()
            .achievement_met(achievement, elapsed, hints_used, score)
    }

    /// Overwrite the state, used when restoring saved progress.
    pub fn restore_state(&mut self, state: PuzzleState) {
        self.state = state;
    }

    /// Carry over hints taken before a save, capped at what the puzzle offers.
    pub fn restore_hints_used(&mut self, hints_used: u32) {
        let available = (self.hints.len() as u32).min(self.max_hints);
        self.hints_used = hints_used.min(available);
    }

    /// Put the puzzle back to a fresh, unsolved condition.
    pub fn reset(&mut self) {
        self.state = PuzzleState::Init;
        self.hints_used = 0;
        self.kind.rules_mut().reset();
    }
}

/// Case-insensitive, whitespace-trimmed comparison form for text answers.
pub(crate) fn normalize_answer(text: &str) -> String {
    text.trim().to_lowercase()
}

/// State after a rejected but well-formed attempt.
pub(crate) fn retry_state(state: PuzzleState) -> PuzzleState {
    match state {
        PuzzleState::Solved => PuzzleState::Solved,
        _ => PuzzleState::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn riddle() -> Puzzle {
        Puzzle::new(
            "r1",
            "Echo",
            PuzzleKind::Riddle(Riddle::new("What answers without a voice?", "echo")),
        )
        .with_hint(Hint::new(2, "It repeats you", 5_000))
        .with_hint(Hint::new(1, "Think of caves", 1_000))
        .with_max_hints(2)
    }

    #[test]
    fn correct_answer_solves() {
        let mut puzzle = riddle();
        let result = puzzle.enter_input("  ECHO ");
        assert!(result.valid);
        assert_eq!(result.new_state, PuzzleState::Solved);
        assert!(puzzle.is_solved());
    }

    #[test]
    fn wrong_answer_moves_to_in_progress() {
        let mut puzzle = riddle();
        let result = puzzle.enter_input("shadow");
        assert!(!result.valid);
        assert_eq!(puzzle.state(), PuzzleState::InProgress);
    }

    #[test]
    fn solved_never_regresses() {
        let mut puzzle = riddle();
        puzzle.enter_input("echo");
        let result = puzzle.enter_input("wrong");
        assert!(!result.valid);
        assert_eq!(result.new_state, PuzzleState::Solved);
        assert!(puzzle.is_solved());
    }

    #[test]
    fn hints_come_out_in_level_order_and_respect_budget() {
        let mut puzzle = riddle();
        assert_eq!(puzzle.hints_remaining(), 2);
        assert_eq!(puzzle.take_hint().map(|h| h.level), Some(1));
        assert_eq!(puzzle.take_hint().map(|h| h.level), Some(2));
        assert!(puzzle.take_hint().is_none());
        assert_eq!(puzzle.hints_used(), 2);
    }

    #[test]
    fn achievement_requires_solved_state_and_matching_puzzle() {
        let mut puzzle = riddle();
        let ach = Achievement::new("a", "A", "", "d", "r1");
        assert!(!puzzle.check_achievement_condition(&ach, Duration::ZERO, 0, 0));
        puzzle.enter_input("echo");
        assert!(puzzle.check_achievement_condition(&ach, Duration::ZERO, 0, 0));

        let other = Achievement::new("b", "B", "", "d", "r2");
        assert!(!puzzle.check_achievement_condition(&other, Duration::ZERO, 0, 0));
    }

    #[test]
    fn reset_clears_state_and_hints() {
        let mut puzzle = riddle();
        puzzle.take_hint();
        puzzle.enter_input("echo");
        puzzle.reset();
        assert_eq!(puzzle.state(), PuzzleState::Init);
        assert_eq!(puzzle.hints_used(), 0);
    }
}
