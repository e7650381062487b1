//! Sliding-shapes puzzle.
//!
//! Commands are `SLIDE <id>:<UP|DOWN|LEFT|RIGHT>` or `CHECK`. A piece slides one
//! cell and is stopped by the board edge or another piece. Unlike the other
//! variants, a malformed command or an early `CHECK` puts the puzzle in FAILED;
//! a later valid move picks the attempt back up.

use std::time::Duration;

use crate::game::achievement::Achievement;
use crate::game::errors::GameError;
use crate::game::puzzle::PuzzleRules;
use crate::game::types::{PuzzleState, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideMove {
    Up,
    Down,
    Left,
    Right,
}

impl SlideMove {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "UP" => Some(SlideMove::Up),
            "DOWN" => Some(SlideMove::Down),
            "LEFT" => Some(SlideMove::Left),
            "RIGHT" => Some(SlideMove::Right),
            _ => None,
        }
    }

    fn delta(self) -> (isize, isize) {
        match self {
            SlideMove::Up => (-1, 0),
            SlideMove::Down => (1, 0),
            SlideMove::Left => (0, -1),
            SlideMove::Right => (0, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SlidePiece {
    id: String,
    position: (usize, usize),
    start: (usize, usize),
    target: (usize, usize),
}

#[derive(Debug, Clone)]
pub struct SlideShapePuzzle {
    pub description: String,
    rows: usize,
    cols: usize,
    pieces: Vec<SlidePiece>,
    moves: u32,
}

impl SlideShapePuzzle {
    pub fn new(description: &str, rows: usize, cols: usize) -> Result<Self, GameError> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidConfiguration(format!(
                "slide board must be at least 1x1, got {}x{}",
                rows, cols
            )));
        }
        Ok(Self {
            description: description.to_string(),
            rows,
            cols,
            pieces: Vec::new(),
            moves: 0,
        })
    }

    /// Place a piece at `start` that must end up on `target`.
    pub fn add_piece(
        &mut self,
        id: &str,
        start: (usize, usize),
        target: (usize, usize),
    ) -> Result<(), GameError> {
        let id = id.trim();
        if id.is_empty() || id.contains([':', ' ']) {
            return Err(GameError::InvalidConfiguration(format!("invalid piece id '{}'", id)));
        }
        if self.piece_index(id).is_some() {
            return Err(GameError::InvalidConfiguration(format!("duplicate piece id '{}'", id)));
        }
        for cell in [start, target] {
            if !self.in_bounds(cell) {
                return Err(GameError::InvalidConfiguration(format!(
                    "piece '{}' cell {:?} lies outside the {}x{} board",
                    id, cell, self.rows, self.cols
                )));
            }
        }
        if self.pieces.iter().any(|p| p.start == start) {
            return Err(GameError::InvalidConfiguration(format!(
                "piece '{}' overlaps another piece at {:?}",
                id, start
            )));
        }
        if self.pieces.iter().any(|p| p.target == target) {
            return Err(GameError::InvalidConfiguration(format!(
                "piece '{}' shares its target {:?} with another piece",
                id, target
            )));
        }
        self.pieces.push(SlidePiece {
            id: id.to_string(),
            position: start,
            start,
            target,
        });
        Ok(())
    }

    pub fn with_piece(
        mut self,
        id: &str,
        start: (usize, usize),
        target: (usize, usize),
    ) -> Result<Self, GameError> {
        self.add_piece(id, start, target)?;
        Ok(self)
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn piece_position(&self, id: &str) -> Option<(usize, usize)> {
        self.piece_index(id).map(|i| self.pieces[i].position)
    }

    pub fn is_arranged(&self) -> bool {
        !self.pieces.is_empty() && self.pieces.iter().all(|p| p.position == p.target)
    }

    fn piece_index(&self, id: &str) -> Option<usize> {
        self.pieces.iter().position(|p| p.id.eq_ignore_ascii_case(id))
    }

    fn in_bounds(&self, (row, col): (usize, usize)) -> bool {
        row < self.rows && col < self.cols
    }

    fn slide(&mut self, index: usize, direction: SlideMove) -> Result<(usize, usize), String> {
        let (row, col) = self.pieces[index].position;
        let (dr, dc) = direction.delta();
        let next = match (row.checked_add_signed(dr), col.checked_add_signed(dc)) {
            (Some(r), Some(c)) if self.in_bounds((r, c)) => (r, c),
            _ => {
                return Err(format!(
                    "Piece '{}' is against the edge of the board.",
                    self.pieces[index].id
                ))
            }
        };
        if let Some(blocker) = self.pieces.iter().find(|p| p.position == next) {
            return Err(format!(
                "Piece '{}' is blocked by piece '{}'.",
                self.pieces[index].id, blocker.id
            ));
        }
        self.pieces[index].position = next;
        self.moves += 1;
        Ok(next)
    }

    fn parse_slide(&self, args: &str) -> Option<(usize, SlideMove)> {
        let (id, dir) = args.split_once(':')?;
        let index = self.piece_index(id.trim())?;
        let direction = SlideMove::parse(dir)?;
        Some((index, direction))
    }
}

impl PuzzleRules for SlideShapePuzzle {
    fn evaluate(&mut self, input: &str, state: PuzzleState) -> ValidationResult {
        let command = input.trim();
        let upper = command.to_ascii_uppercase();

        if upper == "CHECK" {
            return if self.is_arranged() {
                ValidationResult::accepted("Every piece sits on its mark.", PuzzleState::Solved)
            } else {
                ValidationResult::rejected("The pieces are not in place yet.", PuzzleState::Failed)
            };
        }

        let Some(args) = upper.strip_prefix("SLIDE ").map(|_| command[6..].trim()) else {
            return ValidationResult::rejected(
                "Unknown command. Use SLIDE <id>:<UP|DOWN|LEFT|RIGHT> or CHECK.",
                PuzzleState::Failed,
            );
        };
        let Some((index, direction)) = self.parse_slide(args) else {
            return ValidationResult::rejected(
                format!("Cannot read slide command '{}'.", args),
                PuzzleState::Failed,
            );
        };

        match self.slide(index, direction) {
            Ok((row, col)) if self.is_arranged() => ValidationResult::accepted(
                format!("Piece '{}' slides to ({}, {}). The pattern is complete!", self.pieces[index].id, row, col),
                PuzzleState::Solved,
            ),
            Ok((row, col)) => ValidationResult::accepted(
                format!("Piece '{}' slides to ({}, {}).", self.pieces[index].id, row, col),
                PuzzleState::InProgress,
            ),
            Err(message) => {
                let next = if state == PuzzleState::Init {
                    PuzzleState::InProgress
                } else {
                    state
                };
                ValidationResult::rejected(message, next)
            }
        }
    }

    fn question(&self) -> String {
        let layout: Vec<String> = self
            .pieces
            .iter()
            .map(|p| format!("{}@{},{}", p.id, p.position.0, p.position.1))
            .collect();
        format!(
            "{} Board {}x{}: {}",
            self.description,
            self.rows,
            self.cols,
            layout.join(" ")
        )
    }

    fn achievement_met(
        &self,
        achievement: &Achievement,
        elapsed: Duration,
        _hints_used: u32,
        score: u64,
    ) -> bool {
        achievement.within_time_limit(elapsed.as_millis() as u64) && achievement.meets_min_score(score)
    }

    fn reset(&mut self) {
        for piece in &mut self.pieces {
            piece.position = piece.start;
        }
        self.moves = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::puzzle::{Puzzle, PuzzleKind};

    fn board() -> SlideShapePuzzle {
        SlideShapePuzzle::new("Slide the tiles.", 2, 3)
            .unwrap()
            .with_piece("tri", (0, 0), (0, 2))
            .unwrap()
            .with_piece("sq", (1, 0), (1, 0))
            .unwrap()
    }

    fn puzzle() -> Puzzle {
        Puzzle::new("s1", "Tiles", PuzzleKind::SlideShape(board()))
    }

    #[test]
    fn first_move_starts_the_puzzle() {
        let mut p = puzzle();
        let result = p.enter_input("SLIDE tri:RIGHT");
        assert!(result.valid);
        assert_eq!(p.state(), PuzzleState::InProgress);
    }

    #[test]
    fn reaching_layout_solves() {
        let mut p = puzzle();
        p.enter_input("slide TRI:right");
        let result = p.enter_input("SLIDE tri:RIGHT");
        assert!(result.valid);
        assert_eq!(result.new_state, PuzzleState::Solved);
        assert!(p.enter_input("CHECK").valid);
    }

    #[test]
    fn malformed_command_fails() {
        let mut p = puzzle();
        for input in ["", "JUMP", "SLIDE", "SLIDE tri", "SLIDE hex:UP", "SLIDE tri:SIDEWAYS"] {
            let mut fresh = puzzle();
            let result = fresh.enter_input(input);
            assert!(!result.valid, "{input:?}");
            assert_eq!(fresh.state(), PuzzleState::Failed, "{input:?}");
        }
        p.enter_input("SLIDE tri:RIGHT");
        assert_eq!(p.enter_input("CHECK").new_state, PuzzleState::Failed);
    }

    #[test]
    fn failed_attempt_can_continue() {
        let mut p = puzzle();
        p.enter_input("CHECK");
        assert_eq!(p.state(), PuzzleState::Failed);
        p.enter_input("SLIDE tri:RIGHT");
        assert_eq!(p.state(), PuzzleState::InProgress);
    }

    #[test]
    fn blocked_moves_stay_in_progress() {
        let mut p = puzzle();
        let edge = p.enter_input("SLIDE tri:UP");
        assert!(!edge.valid);
        assert!(edge.message.contains("edge"));
        assert_eq!(p.state(), PuzzleState::InProgress);

        let blocked = p.enter_input("SLIDE tri:DOWN");
        assert!(!blocked.valid);
        assert!(blocked.message.contains("blocked by piece 'sq'"));
        assert_eq!(p.state(), PuzzleState::InProgress);
    }

    #[test]
    fn reset_restores_layout() {
        let mut slide = board();
        slide.evaluate("SLIDE tri:RIGHT", PuzzleState::Init);
        assert_eq!(slide.piece_position("tri"), Some((0, 1)));
        assert_eq!(slide.moves(), 1);
        slide.reset();
        assert_eq!(slide.piece_position("tri"), Some((0, 0)));
        assert_eq!(slide.moves(), 0);
    }

    #[test]
    fn configuration_errors() {
        assert!(SlideShapePuzzle::new("x", 0, 3).is_err());
        let slide = SlideShapePuzzle::new("x", 2, 2).unwrap();
        assert!(slide.clone().with_piece("a", (2, 0), (0, 0)).is_err());
        let slide = slide.with_piece("a", (0, 0), (1, 1)).unwrap();
        assert!(slide.clone().with_piece("b", (0, 0), (1, 0)).is_err());
        assert!(slide.clone().with_piece("b", (0, 1), (1, 1)).is_err());
        assert!(slide.with_piece("A", (0, 1), (1, 0)).is_err());
    }
}
