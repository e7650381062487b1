use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::achievement::Achievement;

/// Base time budget for a dungeon when the content does not specify one (10 minutes).
pub const DEFAULT_TIME_BUDGET_MS: u64 = 600_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
    Northwest,
    Northeast,
    Southeast,
    Southwest,
    Up,
    Down,
}

impl Direction {
    /// Every direction in the conventional exit-slot order.
    pub const ALL: [Direction; 10] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Northwest,
        Direction::Northeast,
        Direction::Southeast,
        Direction::Southwest,
        Direction::Up,
        Direction::Down,
    ];

    /// Map a legacy exit-slot index (0..=9) onto a direction.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Northwest => Direction::Southeast,
            Direction::Southeast => Direction::Northwest,
            Direction::Northeast => Direction::Southwest,
            Direction::Southwest => Direction::Northeast,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Parse a direction from user or seed text (`n`, `North`, `ne`, `up`, ...).
    pub fn parse(text: &str) -> Option<Self> {
        let dir = match text.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Direction::North,
            "e" | "east" => Direction::East,
            "s" | "south" => Direction::South,
            "w" | "west" => Direction::West,
            "nw" | "northwest" => Direction::Northwest,
            "ne" | "northeast" => Direction::Northeast,
            "se" | "southeast" => Direction::Southeast,
            "sw" | "southwest" => Direction::Southwest,
            "u" | "up" => Direction::Up,
            "d" | "down" => Direction::Down,
            _ => return None,
        };
        Some(dir)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
            Direction::Northwest => "northwest",
            Direction::Northeast => "northeast",
            Direction::Southeast => "southeast",
            Direction::Southwest => "southwest",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(label)
    }
}

/// Fixed gameplay limits attached to each difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultySettings {
    /// Room transitions allowed per session.
    pub max_moves: u32,
    /// Whether `go_back` to the previous room is permitted.
    pub undo_allowed: bool,
    /// Minimum session time between two consumed hints.
    pub hint_cooldown: Duration,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn settings(self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings {
                max_moves: 200,
                undo_allowed: true,
                hint_cooldown: Duration::ZERO,
            },
            Difficulty::Normal => DifficultySettings {
                max_moves: 100,
                undo_allowed: true,
                hint_cooldown: Duration::from_secs(30),
            },
            Difficulty::Hard => DifficultySettings {
                max_moves: 50,
                undo_allowed: false,
                hint_cooldown: Duration::from_secs(60),
            },
        }
    }

    /// Multiplier applied to the base time budget.
    pub fn time_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 2.0,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.5,
        }
    }

    /// Scale a base budget (milliseconds) by this difficulty's multiplier.
    pub fn time_budget_ms(self, base_ms: u64) -> u64 {
        (base_ms as f64 * self.time_multiplier()).round() as u64
    }

    /// Decode the integer difficulty code used by stored content.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Difficulty::Easy,
            3 | 4 => Difficulty::Hard,
            _ => Difficulty::Normal,
        }
    }

    /// Case-insensitive name lookup (`easy`, `Normal`, `HARD`).
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "EASY" => Some(Difficulty::Easy),
            "NORMAL" | "MEDIUM" => Some(Difficulty::Normal),
            "HARD" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PuzzleState {
    #[default]
    Init,
    InProgress,
    Solved,
    Failed,
}

impl PuzzleState {
    pub fn is_solved(self) -> bool {
        self == PuzzleState::Solved
    }
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PuzzleState::Init => "INIT",
            PuzzleState::InProgress => "IN_PROGRESS",
            PuzzleState::Solved => "SOLVED",
            PuzzleState::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hint {
    pub level: u32,
    pub text: String,
    /// Penalty added to the session timer when the hint is consumed.
    #[serde(default)]
    pub time_cost_ms: u64,
}

impl Hint {
    pub fn new(level: u32, text: &str, time_cost_ms: u64) -> Self {
        Self {
            level,
            text: text.to_string(),
            time_cost_ms,
        }
    }
}

/// Outcome of feeding raw input to a puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
    pub new_state: PuzzleState,
}

impl ValidationResult {
    pub fn accepted(message: impl Into<String>, new_state: PuzzleState) -> Self {
        Self {
            valid: true,
            message: message.into(),
            new_state,
        }
    }

    pub fn rejected(message: impl Into<String>, new_state: PuzzleState) -> Self {
        Self {
            valid: false,
            message: message.into(),
            new_state,
        }
    }
}

/// Reward-gating configuration carried by every puzzle; defaults to no requirement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ItemRequirement {
    #[serde(default)]
    pub requires_item: bool,
    #[serde(default)]
    pub required_item_key: Option<String>,
}

impl ItemRequirement {
    pub fn item(key: &str) -> Self {
        Self {
            requires_item: true,
            required_item_key: Some(key.to_string()),
        }
    }

    /// The key that must be in the inventory, if the gate is active.
    pub fn required_key(&self) -> Option<&str> {
        if self.requires_item {
            self.required_item_key.as_deref().filter(|k| !k.is_empty())
        } else {
            None
        }
    }
}

fn new_account_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    #[serde(default = "new_account_id")]
    pub id: String,
    pub username: String,
    /// Argon2 PHC string; empty when the store carried no usable credential.
    #[serde(default, alias = "passwordHash")]
    pub password_hash: String,
    #[serde(default)]
    pub score: u64,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(username: &str, password_hash: &str) -> Self {
        Self {
            id: new_account_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            score: 0,
            rank: 0,
            achievements: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn matches_username(&self, username: &str) -> bool {
        self.username.eq_ignore_ascii_case(username.trim())
    }

    /// Raise the stored score if `candidate` beats it. Returns true when changed.
    pub fn ratchet_score(&mut self, candidate: u64) -> bool {
        if candidate > self.score {
            self.score = candidate;
            true
        } else {
            false
        }
    }

    pub fn has_achievement(&self, achievement_id: &str) -> bool {
        self.achievements.iter().any(|a| a.id == achievement_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_budget_multipliers() {
        assert_eq!(Difficulty::Easy.time_budget_ms(600_000), 1_200_000);
        assert_eq!(Difficulty::Normal.time_budget_ms(600_000), 600_000);
        assert_eq!(Difficulty::Hard.time_budget_ms(600_000), 300_000);
    }

    #[test]
    fn difficulty_codes_and_names() {
        assert_eq!(Difficulty::from_code(1), Difficulty::Easy);
        assert_eq!(Difficulty::from_code(2), Difficulty::Normal);
        assert_eq!(Difficulty::from_code(3), Difficulty::Hard);
        assert_eq!(Difficulty::from_code(4), Difficulty::Hard);
        assert_eq!(Difficulty::from_code(-7), Difficulty::Normal);
        assert_eq!(Difficulty::parse("hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse(" Easy "), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse("nightmare"), None);
    }

    #[test]
    fn direction_slots_and_parsing() {
        assert_eq!(Direction::from_index(0), Some(Direction::North));
        assert_eq!(Direction::from_index(9), Some(Direction::Down));
        assert_eq!(Direction::from_index(10), None);
        assert_eq!(Direction::parse("NE"), Some(Direction::Northeast));
        assert_eq!(Direction::parse("up"), Some(Direction::Up));
        assert_eq!(Direction::North.opposite(), Direction::South);
    }

    #[test]
    fn item_requirement_only_active_with_flag() {
        let none = ItemRequirement::default();
        assert_eq!(none.required_key(), None);

        let flag_without_key = ItemRequirement {
            requires_item: false,
            required_item_key: Some("KEY".into()),
        };
        assert_eq!(flag_without_key.required_key(), None);

        assert_eq!(ItemRequirement::item("KEY").required_key(), Some("KEY"));
    }

    #[test]
    fn account_accepts_camel_case_hash_and_missing_id() {
        let account: Account =
            serde_json::from_str(r#"{"username": "bob", "passwordHash": "$argon2id$x", "score": 7}"#).unwrap();
        assert_eq!(account.password_hash, "$argon2id$x");
        assert_eq!(account.score, 7);
        assert!(!account.id.is_empty());
    }

    #[test]
    fn account_score_ratchet_never_lowers() {
        let mut account = Account::new("alice", "");
        assert!(account.ratchet_score(150));
        assert!(!account.ratchet_score(100));
        assert_eq!(account.score, 150);
    }
}
