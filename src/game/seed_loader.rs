//! Dungeon content loader.
//!
//! Dungeons are authored as JSON and turned into the [`Dungeon`] object graph
//! once at startup. Puzzle variants are recognised by which fields are present:
//!
//! | fields                 | variant        |
//! |------------------------|----------------|
//! | `maze`                 | maze           |
//! | `pieces`               | slide puzzle   |
//! | `targets`              | shape match    |
//! | `code_prompt`/`codes`  | code puzzle    |
//! | `scrambled` + `answer` | word scramble  |
//! | `question` + `answer`  | riddle         |
//!
//! A blank `scrambled` string asks for the answer's letters to be shuffled at load.
//!
//! Exits are either a direction-keyed object or the older ten-slot
//! `open_exits` / `locked_exits` arrays (N, E, S, W, NW, NE, SE, SW, Up, Down).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::game::achievement::Achievement;
use crate::game::dungeon::Dungeon;
use crate::game::errors::GameError;
use crate::game::puzzle::{
    CodePuzzle, MazePuzzle, Puzzle, PuzzleKind, Riddle, ShapeMatchPuzzle, ShapeTarget,
    SlideShapePuzzle, WordScramble,
};
use crate::game::room::{Exit, Room};
use crate::game::types::{Difficulty, Direction, Hint, DEFAULT_TIME_BUDGET_MS};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DifficultySeed {
    Code(i64),
    Name(String),
}

impl DifficultySeed {
    pub fn resolve(&self) -> Difficulty {
        match self {
            DifficultySeed::Code(code) => Difficulty::from_code(*code),
            DifficultySeed::Name(name) => Difficulty::parse(name).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeSeed {
    Millis(u64),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExitSeed {
    Target(String),
    Detailed {
        to: String,
        #[serde(default)]
        locked: bool,
        #[serde(default)]
        requires: Vec<String>,
        #[serde(default)]
        lock_text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSeed {
    pub label: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub angle: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieceSeed {
    pub id: String,
    pub start: [usize; 2],
    pub target: [usize; 2],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PuzzleSeed {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hints: Vec<Hint>,
    #[serde(default)]
    pub max_hints: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<DifficultySeed>,
    #[serde(default)]
    pub allowed_time: Option<TimeSeed>,
    #[serde(default)]
    pub reward_item: Option<String>,
    #[serde(default)]
    pub requires_item: bool,
    #[serde(default)]
    pub required_item_key: Option<String>,

    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub scrambled: Option<String>,
    #[serde(default)]
    pub code_prompt: Option<String>,
    #[serde(default)]
    pub codes: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub targets: Vec<TargetSeed>,
    #[serde(default)]
    pub position_tolerance: Option<f64>,
    #[serde(default)]
    pub angle_tolerance: Option<f64>,
    #[serde(default)]
    pub rows: Option<usize>,
    #[serde(default)]
    pub cols: Option<usize>,
    #[serde(default)]
    pub pieces: Vec<PieceSeed>,
    #[serde(default)]
    pub maze: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub puzzles: Vec<PuzzleSeed>,
    #[serde(default)]
    pub hints: Vec<Hint>,
    #[serde(default)]
    pub exits: BTreeMap<String, ExitSeed>,
    #[serde(default)]
    pub open_exits: Vec<Option<String>>,
    #[serde(default)]
    pub locked_exits: Vec<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementSeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub puzzle_id: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
    #[serde(default)]
    pub min_score: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonSeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Option<DifficultySeed>,
    #[serde(default)]
    pub time_limit: Option<TimeSeed>,
    #[serde(default)]
    pub start_room: Option<String>,
    pub rooms: Vec<RoomSeed>,
    #[serde(default)]
    pub achievements: Vec<AchievementSeed>,
}

/// Parse `HH:MM:SS` into milliseconds.
pub fn parse_hms(text: &str) -> Option<u64> {
    let mut parts = text.trim().split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    let hours: u64 = h.trim().parse().ok()?;
    let minutes: u64 = m.trim().parse().ok()?;
    let seconds: u64 = s.trim().parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1000)
}

/// Dungeon time budget from content, falling back to `default_ms` when the
/// field is absent or malformed.
pub fn parse_time_limit(seed: Option<&TimeSeed>, default_ms: u64) -> u64 {
    match seed {
        Some(TimeSeed::Millis(ms)) if *ms > 0 => *ms,
        Some(TimeSeed::Text(text)) => match parse_hms(text) {
            Some(ms) if ms > 0 => ms,
            _ => {
                warn!("Ignoring malformed time limit '{}'", text);
                default_ms
            }
        },
        _ => default_ms,
    }
}

/// Read and build every dungeon in a JSON file.
pub fn load_dungeons_from_json<P: AsRef<Path>>(
    path: P,
    default_budget_ms: u64,
) -> Result<Vec<Dungeon>, GameError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let seeds: Vec<DungeonSeed> = serde_json::from_str(&contents).map_err(|e| {
        GameError::InvalidConfiguration(format!("failed to parse {}: {}", path.display(), e))
    })?;
    build_dungeons(seeds, default_budget_ms)
}

/// Build dungeons from JSON text.
pub fn parse_dungeons(json: &str, default_budget_ms: u64) -> Result<Vec<Dungeon>, GameError> {
    let seeds: Vec<DungeonSeed> = serde_json::from_str(json)?;
    build_dungeons(seeds, default_budget_ms)
}

pub fn build_dungeons(seeds: Vec<DungeonSeed>, default_budget_ms: u64) -> Result<Vec<Dungeon>, GameError> {
    seeds
        .into_iter()
        .map(|seed| build_dungeon(seed, default_budget_ms))
        .collect()
}

pub fn build_dungeon(seed: DungeonSeed, default_budget_ms: u64) -> Result<Dungeon, GameError> {
    let default_budget_ms = if default_budget_ms == 0 {
        DEFAULT_TIME_BUDGET_MS
    } else {
        default_budget_ms
    };
    let mut dungeon = Dungeon::new(&seed.id, &seed.name, &seed.description)
        .with_base_time_budget_ms(parse_time_limit(seed.time_limit.as_ref(), default_budget_ms))
        .with_difficulty(seed.difficulty.as_ref().map(DifficultySeed::resolve).unwrap_or_default());

    for room in seed.rooms {
        dungeon = dungeon.with_room(build_room(room)?);
    }
    if let Some(start) = &seed.start_room {
        if dungeon.room_index(start).is_none() {
            return Err(GameError::InvalidConfiguration(format!(
                "dungeon '{}' starts in unknown room '{}'",
                seed.id, start
            )));
        }
        dungeon = dungeon.with_start_room(start);
    }
    for ach in seed.achievements {
        let mut achievement = Achievement::new(&ach.id, &ach.name, &ach.description, &seed.id, &ach.puzzle_id)
            .with_points(ach.points);
        if let Some(ms) = ach.time_limit_ms {
            achievement = achievement.with_time_limit_ms(ms);
        }
        if let Some(score) = ach.min_score {
            achievement = achievement.with_min_score(score);
        }
        dungeon = dungeon.with_achievement(achievement);
    }

    dungeon.validate()?;
    debug!(
        "Loaded dungeon {} ({} rooms, {} ms base budget)",
        dungeon.id,
        dungeon.rooms().len(),
        dungeon.base_time_budget_ms()
    );
    Ok(dungeon)
}

fn build_room(seed: RoomSeed) -> Result<Room, GameError> {
    let mut room = Room::new(&seed.id, &seed.name, &seed.description);
    for puzzle in seed.puzzles {
        room = room.with_puzzle(build_puzzle(puzzle)?);
    }
    for hint in seed.hints {
        room = room.with_hint(hint);
    }

    for (slot, target) in seed.open_exits.iter().enumerate() {
        if let Some(target) = target {
            room.set_exit(legacy_direction(&seed.id, slot)?, Exit::open(target));
        }
    }
    for (slot, target) in seed.locked_exits.iter().enumerate() {
        if let Some(target) = target {
            room.set_exit(legacy_direction(&seed.id, slot)?, Exit::locked(target, &[], ""));
        }
    }
    for (name, exit) in &seed.exits {
        let direction = Direction::parse(name).ok_or_else(|| {
            GameError::InvalidConfiguration(format!("room '{}' has unknown exit direction '{}'", seed.id, name))
        })?;
        let exit = match exit {
            ExitSeed::Target(target) => Exit::open(target),
            ExitSeed::Detailed {
                to,
                locked,
                requires,
                lock_text,
            } => {
                if *locked || !requires.is_empty() {
                    let gating: Vec<&str> = requires.iter().map(String::as_str).collect();
                    Exit::locked(to, &gating, lock_text)
                } else {
                    Exit::open(to)
                }
            }
        };
        room.set_exit(direction, exit);
    }
    Ok(room)
}

fn legacy_direction(room_id: &str, slot: usize) -> Result<Direction, GameError> {
    Direction::from_index(slot).ok_or_else(|| {
        GameError::InvalidConfiguration(format!(
            "room '{}' uses exit slot {} (only 0-9 exist)",
            room_id, slot
        ))
    })
}

fn build_puzzle(seed: PuzzleSeed) -> Result<Puzzle, GameError> {
    let title = if seed.title.trim().is_empty() {
        seed.id.clone()
    } else {
        seed.title.clone()
    };
    let kind = build_kind(&seed)?;
    let mut puzzle = Puzzle::new(&seed.id, &title, kind)
        .with_difficulty(seed.difficulty.as_ref().map(DifficultySeed::resolve).unwrap_or_default())
        .with_allowed_time_ms(parse_time_limit(seed.allowed_time.as_ref(), 0));
    if let Some(max) = seed.max_hints {
        puzzle = puzzle.with_max_hints(max);
    }
    for hint in seed.hints {
        puzzle = puzzle.with_hint(hint);
    }
    if let Some(reward) = seed.reward_item.as_deref().filter(|r| !r.trim().is_empty()) {
        puzzle = puzzle.with_reward(reward.trim());
    }
    puzzle.requirement.requires_item = seed.requires_item;
    puzzle.requirement.required_item_key = seed.required_item_key;
    Ok(puzzle)
}

fn build_kind(seed: &PuzzleSeed) -> Result<PuzzleKind, GameError> {
    if !seed.maze.is_empty() {
        return Ok(PuzzleKind::Maze(MazePuzzle::from_rows(seed.maze.as_slice())?));
    }
    let description = seed.description.as_deref().unwrap_or_default();
    if !seed.pieces.is_empty() {
        let (Some(rows), Some(cols)) = (seed.rows, seed.cols) else {
            return Err(GameError::InvalidConfiguration(format!(
                "slide puzzle '{}' needs rows and cols",
                seed.id
            )));
        };
        let mut slide = SlideShapePuzzle::new(description, rows, cols)?;
        for piece in &seed.pieces {
            slide.add_piece(
                &piece.id,
                (piece.start[0], piece.start[1]),
                (piece.target[0], piece.target[1]),
            )?;
        }
        return Ok(PuzzleKind::SlideShape(slide));
    }
    if !seed.targets.is_empty() {
        let mut shapes = ShapeMatchPuzzle::new(description);
        if seed.position_tolerance.is_some() || seed.angle_tolerance.is_some() {
            let position = seed.position_tolerance.unwrap_or(shapes.position_tolerance);
            let angle = seed.angle_tolerance.unwrap_or(shapes.angle_tolerance);
            shapes = shapes.with_tolerances(position, angle);
        }
        for t in &seed.targets {
            shapes.add_target(ShapeTarget::new(&t.label, t.x, t.y, t.angle))?;
        }
        return Ok(PuzzleKind::ShapeMatch(shapes));
    }
    if seed.code_prompt.is_some() || !seed.codes.is_empty() {
        let prompt = seed.code_prompt.as_deref().unwrap_or("Enter the code.");
        return Ok(PuzzleKind::Code(CodePuzzle::new(prompt).with_codes(seed.codes.iter())));
    }
    match (&seed.scrambled, &seed.question, &seed.answer) {
        (Some(scrambled), _, Some(answer)) if scrambled.trim().is_empty() => {
            Ok(PuzzleKind::WordScramble(WordScramble::from_answer(answer)))
        }
        (Some(scrambled), _, Some(answer)) => Ok(PuzzleKind::WordScramble(WordScramble::new(scrambled, answer))),
        (None, Some(question), Some(answer)) => Ok(PuzzleKind::Riddle(Riddle::new(question, answer))),
        _ => Err(GameError::InvalidConfiguration(format!(
            "puzzle '{}' does not match any puzzle type",
            seed.id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::puzzle::PuzzleType;

    const SEED: &str = r#"[
      {
        "id": "crypt",
        "name": "The Crypt",
        "difficulty": 3,
        "time_limit": "00:20:00",
        "rooms": [
          {
            "id": "antechamber",
            "name": "Antechamber",
            "puzzles": [
              {"id": "p-code", "title": "Keypad", "code_prompt": "Enter the word", "codes": ["bones"]},
              {"id": "p-riddle", "question": "What has keys but no locks?", "answer": "piano", "reward_item": "BRASS_KEY"}
            ],
            "exits": {"north": {"to": "ossuary", "requires": ["p-code"], "lock_text": "Bars block the way."}},
            "open_exits": [null, "gallery"]
          },
          {
            "id": "ossuary",
            "name": "Ossuary",
            "puzzles": [
              {"id": "p-maze", "maze": ["S.", ".G"]},
              {"id": "p-scramble", "scrambled": "lbea", "answer": "able", "requires_item": true, "required_item_key": "BRASS_KEY"}
            ],
            "locked_exits": [null, null, "antechamber"]
          },
          {"id": "gallery", "name": "Gallery", "description": "Empty frames."}
        ],
        "achievements": [
          {"id": "quick", "name": "Quick", "puzzle_id": "p-code", "points": 15, "time_limit_ms": 60000}
        ]
      }
    ]"#;

    #[test]
    fn builds_full_graph() {
        let dungeons = parse_dungeons(SEED, DEFAULT_TIME_BUDGET_MS).unwrap();
        assert_eq!(dungeons.len(), 1);
        let d = &dungeons[0];
        assert_eq!(d.difficulty(), Difficulty::Hard);
        assert_eq!(d.base_time_budget_ms(), 1_200_000);
        assert_eq!(d.time_budget_ms(), 600_000);

        let ante = d.room("antechamber").unwrap();
        assert_eq!(ante.puzzle("p-code").unwrap().puzzle_type(), PuzzleType::Code);
        assert_eq!(ante.puzzle("p-riddle").unwrap().reward_item.as_deref(), Some("BRASS_KEY"));
        let north = ante.exit(Direction::North).unwrap();
        assert!(north.locked);
        assert_eq!(north.gating_puzzles, vec!["p-code".to_string()]);
        assert_eq!(ante.exit(Direction::East).unwrap().target_room, "gallery");

        let ossuary = d.room("ossuary").unwrap();
        assert_eq!(ossuary.puzzle("p-maze").unwrap().puzzle_type(), PuzzleType::Maze);
        let scramble = ossuary.puzzle("p-scramble").unwrap();
        assert_eq!(scramble.requirement.required_key(), Some("BRASS_KEY"));
        assert!(ossuary.exit(Direction::South).unwrap().locked);
        assert_eq!(d.achievements[0].dungeon_id, "crypt");
    }

    #[test]
    fn difficulty_strings_and_defaults() {
        assert_eq!(DifficultySeed::Name("easy".into()).resolve(), Difficulty::Easy);
        assert_eq!(DifficultySeed::Name("bogus".into()).resolve(), Difficulty::Normal);
        assert_eq!(DifficultySeed::Code(4).resolve(), Difficulty::Hard);
    }

    #[test]
    fn time_limits() {
        assert_eq!(parse_hms("01:02:03"), Some(3_723_000));
        assert_eq!(parse_hms("10:00"), None);
        assert_eq!(parse_hms("aa:bb:cc"), None);
        assert_eq!(parse_time_limit(Some(&TimeSeed::Text("nope".into())), 600_000), 600_000);
        assert_eq!(parse_hms("99999999999999999:00:00"), None);
        assert_eq!(
            parse_time_limit(Some(&TimeSeed::Text("99999999999999999:00:00".into())), 600_000),
            600_000
        );
        assert_eq!(parse_time_limit(None, 600_000), 600_000);
        assert_eq!(parse_time_limit(Some(&TimeSeed::Millis(5_000)), 600_000), 5_000);
    }

    #[test]
    fn malformed_maze_is_rejected_at_load() {
        let json = r##"[{"id":"d","name":"D","rooms":[{"id":"r","name":"R",
            "puzzles":[{"id":"m","maze":["S..","#.","..G"]}]}]}]"##;
        let err = parse_dungeons(json, DEFAULT_TIME_BUDGET_MS).unwrap_err();
        assert!(matches!(err, GameError::InvalidConfiguration(_)));
    }

    #[test]
    fn blank_scramble_is_shuffled_from_the_answer() {
        let json = r#"[{"id":"d","name":"D","rooms":[{"id":"r","name":"R",
            "puzzles":[{"id":"w","scrambled":"","answer":"candle"}]}]}]"#;
        let mut dungeons = parse_dungeons(json, DEFAULT_TIME_BUDGET_MS).unwrap();
        let puzzle = dungeons[0].room_mut("r").unwrap().puzzle_mut("w").unwrap();
        assert_eq!(puzzle.puzzle_type(), PuzzleType::WordScramble);
        let question = puzzle.question();
        let shown = question.trim_start_matches("Unscramble: ");
        assert_ne!(shown, "candle");
        assert_eq!(shown.len(), 6);
        assert!(puzzle.enter_input("CANDLE").valid);
    }

    #[test]
    fn unknown_puzzle_shape_and_dangling_exit_are_rejected() {
        let untyped = r#"[{"id":"d","name":"D","rooms":[{"id":"r","name":"R","puzzles":[{"id":"x"}]}]}]"#;
        assert!(parse_dungeons(untyped, 0).is_err());
        let dangling = r#"[{"id":"d","name":"D","rooms":[{"id":"r","name":"R","exits":{"up":"attic"}}]}]"#;
        assert!(parse_dungeons(dangling, 0).is_err());
    }
}
