//! Grid maze puzzle.
//!
//! Built from text rows: `#` wall, `.` open floor, `S` start, `G` goal.
//! Input is either a direction token (`U/D/L/R`, `W/A/S/D`, `UP/DOWN/LEFT/RIGHT`,
//! `NORTH/SOUTH/EAST/WEST`) or an absolute `row,col` that must be next to the
//! current cell.
//!
//! `D` always means down, so the WASD scheme has no right move; use `R`,
//! `RIGHT` or `EAST` instead.

use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use crate::game::achievement::Achievement;
use crate::game::errors::GameError;
use crate::game::puzzle::{retry_state, PuzzleRules};
use crate::game::types::{PuzzleState, ValidationResult};

type Cell = (usize, usize);

#[derive(Debug, Clone)]
pub struct MazePuzzle {
    rows: usize,
    cols: usize,
    walls: BTreeSet<Cell>,
    start: Cell,
    goal: Cell,
    position: Cell,
    moves: u32,
}

impl MazePuzzle {
    /// Parse a maze from equally long text rows.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GameError> {
        let Some(first) = rows.first() else {
            return Err(GameError::InvalidConfiguration("maze has no rows".to_string()));
        };
        let cols = first.as_ref().chars().count();
        if cols == 0 {
            return Err(GameError::InvalidConfiguration("maze rows are empty".to_string()));
        }

        let mut walls = BTreeSet::new();
        let mut start = None;
        let mut goal = None;
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let len = row.chars().count();
            if len != cols {
                return Err(GameError::InvalidConfiguration(format!(
                    "maze row {} has {} cells, expected {}",
                    r, len, cols
                )));
            }
            for (c, ch) in row.chars().enumerate() {
                match ch {
                    '#' => {
                        walls.insert((r, c));
                    }
                    '.' | ' ' => {}
                    'S' | 's' => {
                        if start.replace((r, c)).is_some() {
                            return Err(GameError::InvalidConfiguration(
                                "maze has more than one start".to_string(),
                            ));
                        }
                    }
                    'G' | 'g' => {
                        if goal.replace((r, c)).is_some() {
                            return Err(GameError::InvalidConfiguration(
                                "maze has more than one goal".to_string(),
                            ));
                        }
                    }
                    other => {
                        return Err(GameError::InvalidConfiguration(format!(
                            "unknown maze symbol '{}' at {},{}",
                            other, r, c
                        )))
                    }
                }
            }
        }

        let start = start
            .ok_or_else(|| GameError::InvalidConfiguration("maze has no start (S)".to_string()))?;
        let goal = goal
            .ok_or_else(|| GameError::InvalidConfiguration("maze has no goal (G)".to_string()))?;

        Ok(Self {
            rows: rows.len(),
            cols,
            walls,
            start,
            goal,
            position: start,
            moves: 0,
        })
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        self.walls.contains(&cell)
    }

    /// Fewest moves from start to goal, or `None` when the goal is walled off.
    pub fn shortest_path_len(&self) -> Option<u32> {
        let mut seen = BTreeSet::from([self.start]);
        let mut queue = VecDeque::from([(self.start, 0u32)]);
        while let Some((cell, dist)) = queue.pop_front() {
            if cell == self.goal {
                return Some(dist);
            }
            for delta in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                if let Some(next) = self.step(cell, delta) {
                    if !self.is_wall(next) && seen.insert(next) {
                        queue.push_back((next, dist + 1));
                    }
                }
            }
        }
        None
    }

    /// Text rendering with `@` for the player.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows);
        for r in 0..self.rows {
            let line: String = (0..self.cols)
                .map(|c| {
                    let cell = (r, c);
                    if cell == self.position {
                        '@'
                    } else if cell == self.goal {
                        'G'
                    } else if self.is_wall(cell) {
                        '#'
                    } else {
                        '.'
                    }
                })
                .collect();
            lines.push(line);
        }
        lines.join("\n")
    }

    fn step(&self, (row, col): Cell, (dr, dc): (isize, isize)) -> Option<Cell> {
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;
        (r < self.rows && c < self.cols).then_some((r, c))
    }

    fn parse_direction(token: &str) -> Option<((isize, isize), &'static str)> {
        let dir = match token.to_ascii_uppercase().as_str() {
            "U" | "W" | "UP" | "NORTH" => ((-1, 0), "north"),
            "D" | "S" | "DOWN" | "SOUTH" => ((1, 0), "south"),
            "L" | "A" | "LEFT" | "WEST" => ((0, -1), "west"),
            "R" | "RIGHT" | "EAST" => ((0, 1), "east"),
            _ => return None,
        };
        Some(dir)
    }

    fn parse_coordinate(token: &str) -> Option<Cell> {
        let (r, c) = token.split_once(',')?;
        Some((r.trim().parse().ok()?, c.trim().parse().ok()?))
    }

    fn resolve_target(&self, token: &str) -> Result<(Cell, Option<&'static str>), String> {
        if let Some((delta, name)) = Self::parse_direction(token) {
            return match self.step(self.position, delta) {
                Some(cell) => Ok((cell, Some(name))),
                None => Err(format!("The edge of the maze stops you going {}.", name)),
            };
        }
        if let Some(cell) = Self::parse_coordinate(token) {
            if cell.0 >= self.rows || cell.1 >= self.cols {
                return Err(format!(
                    "({}, {}) is outside the {}x{} maze.",
                    cell.0, cell.1, self.rows, self.cols
                ));
            }
            let distance = self.position.0.abs_diff(cell.0) + self.position.1.abs_diff(cell.1);
            if distance != 1 {
                return Err(format!(
                    "({}, {}) is not next to your position ({}, {}).",
                    cell.0, cell.1, self.position.0, self.position.1
                ));
            }
            return Ok((cell, None));
        }
        Err(format!(
            "'{}' is not a move. Use U/D/L/R, WASD, a direction word, or row,col.",
            token
        ))
    }
}

impl PuzzleRules for MazePuzzle {
    fn evaluate(&mut self, input: &str, state: PuzzleState) -> ValidationResult {
        let token = input.trim();
        if token.is_empty() {
            return ValidationResult::rejected("Choose a direction to move.", retry_state(state));
        }
        let (target, heading) = match self.resolve_target(token) {
            Ok(found) => found,
            Err(message) => return ValidationResult::rejected(message, retry_state(state)),
        };
        if self.is_wall(target) {
            let message = match heading {
                Some(name) => format!("A wall blocks the way {}.", name),
                None => format!("A wall stands at ({}, {}).", target.0, target.1),
            };
            return ValidationResult::rejected(message, retry_state(state));
        }
        self.position = target;
        self.moves += 1;
        if self.position == self.goal {
            ValidationResult::accepted("You step onto the exit. The maze is solved!", PuzzleState::Solved)
        } else {
            ValidationResult::accepted(
                format!("You move to ({}, {}).", target.0, target.1),
                PuzzleState::InProgress,
            )
        }
    }

    fn question(&self) -> String {
        format!(
            "Find the exit at ({}, {}). You are at ({}, {}).\n{}",
            self.goal.0,
            self.goal.1,
            self.position.0,
            self.position.1,
            self.render()
        )
    }

    fn achievement_met(
        &self,
        achievement: &Achievement,
        elapsed: Duration,
        _hints_used: u32,
        _score: u64,
    ) -> bool {
        self.shortest_path_len() == Some(self.moves)
            && achievement.within_time_limit(elapsed.as_millis() as u64)
    }

    fn reset(&mut self) {
        self.position = self.start;
        self.moves = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maze() -> MazePuzzle {
        MazePuzzle::from_rows(&["S.#", "#..", "##G"]).unwrap()
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let err = MazePuzzle::from_rows(&["S..", "#.", "..G"]).unwrap_err();
        assert!(matches!(err, GameError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn missing_start_goal_or_unknown_symbols_are_rejected() {
        assert!(MazePuzzle::from_rows(&["...", "..G"]).is_err());
        assert!(MazePuzzle::from_rows(&["S..", "..."]).is_err());
        assert!(MazePuzzle::from_rows(&["S.X", "..G"]).is_err());
        assert!(MazePuzzle::from_rows::<&str>(&[]).is_err());
    }

    #[test]
    fn walk_to_goal_with_mixed_tokens() {
        let mut m = maze();
        assert_eq!(m.evaluate("R", PuzzleState::Init).new_state, PuzzleState::InProgress);
        assert_eq!(m.evaluate("down", PuzzleState::InProgress).new_state, PuzzleState::InProgress);
        assert_eq!(m.evaluate("1,2", PuzzleState::InProgress).new_state, PuzzleState::InProgress);
        let last = m.evaluate("s", PuzzleState::InProgress);
        assert!(last.valid);
        assert_eq!(last.new_state, PuzzleState::Solved);
        assert_eq!(m.moves(), 4);
    }

    #[test]
    fn walls_and_edges_block_with_hints() {
        let mut m = maze();
        let wall = m.evaluate("S", PuzzleState::Init);
        assert!(!wall.valid);
        assert!(wall.message.contains("wall"));
        assert_eq!(wall.new_state, PuzzleState::InProgress);

        let edge = m.evaluate("north", PuzzleState::InProgress);
        assert!(!edge.valid);
        assert!(edge.message.contains("edge"));
        assert_eq!(m.position(), (0, 0));
    }

    #[test]
    fn coordinates_must_be_adjacent_and_inside() {
        let mut m = maze();
        assert!(m.evaluate("2,2", PuzzleState::Init).message.contains("not next to"));
        assert!(m.evaluate("9,9", PuzzleState::Init).message.contains("outside"));
        assert!(!m.evaluate("jump", PuzzleState::Init).valid);
        assert_eq!(m.moves(), 0);
    }

    #[test]
    fn shortest_path_and_flawless_achievement() {
        let mut m = maze();
        assert_eq!(m.shortest_path_len(), Some(4));
        for step in ["R", "D", "R", "D"] {
            m.evaluate(step, PuzzleState::InProgress);
        }
        let ach = Achievement::new("flawless", "Flawless", "", "d", "m");
        assert!(m.achievement_met(&ach, Duration::from_secs(1), 2, 0));

        m.reset();
        for step in ["R", "L", "R", "D", "R", "D"] {
            m.evaluate(step, PuzzleState::InProgress);
        }
        assert_eq!(m.position(), m.goal());
        assert!(!m.achievement_met(&ach, Duration::from_secs(1), 0, 0));
    }

    #[test]
    fn render_marks_player() {
        let m = maze();
        assert_eq!(m.render(), "@.#\n#..\n##G");
    }
}
