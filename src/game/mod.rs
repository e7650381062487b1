//! Escape-room core: puzzles, rooms, dungeons and the orchestration facade.
//!
//! Leaf modules ([`timer`], [`puzzle`], [`room`], [`inventory`]) know nothing
//! about accounts or storage. [`dungeon`] wires rooms to a timer and the
//! transition rules, and [`facade`] coordinates a player's session on top of
//! the shared [`registry`] repositories.

pub mod achievement;
pub mod dungeon;
pub mod errors;
pub mod facade;
pub mod inventory;
pub mod leaderboard;
pub mod map;
pub mod progress;
pub mod puzzle;
pub mod registry;
pub mod room;
pub mod seed_loader;
pub mod timer;
pub mod types;

pub use achievement::Achievement;
pub use dungeon::{Dungeon, RoomChange};
pub use errors::GameError;
pub use facade::{EscapeFacade, HintResponse, PersistenceHook, PuzzleView, RoomView};
pub use inventory::Inventory;
pub use leaderboard::{Leaderboard, LeaderboardEntry, SubmitOutcome};
pub use map::DungeonMap;
pub use progress::{Progress, ProgressManager};
pub use puzzle::{Puzzle, PuzzleKind, PuzzleType};
pub use registry::{AccountRepository, DungeonRepository, DungeonSummary, PlayerScore};
pub use room::{Exit, Room};
pub use timer::Timer;
pub use types::{Account, Difficulty, Direction, Hint, PuzzleState, ValidationResult};
