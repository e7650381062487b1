//! Rooms and their direction-indexed exits.

use std::collections::BTreeMap;

use crate::game::puzzle::Puzzle;
use crate::game::types::{Direction, Hint};

/// Lock text used when content does not provide one.
pub const DEFAULT_LOCK_TEXT: &str = "The way is sealed. Solve the puzzles here to open it.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit {
    pub target_room: String,
    pub locked: bool,
    /// Puzzles in the owning room that open this exit. Empty means all of them.
    pub gating_puzzles: Vec<String>,
    pub lock_text: String,
}

impl Exit {
    pub fn open(target_room: &str) -> Self {
        Self {
            target_room: target_room.to_string(),
            locked: false,
            gating_puzzles: Vec::new(),
            lock_text: String::new(),
        }
    }

    pub fn locked(target_room: &str, gating_puzzles: &[&str], lock_text: &str) -> Self {
        let lock_text = if lock_text.trim().is_empty() {
            DEFAULT_LOCK_TEXT.to_string()
        } else {
            lock_text.to_string()
        };
        Self {
            target_room: target_room.to_string(),
            locked: true,
            gating_puzzles: gating_puzzles.iter().map(|p| p.to_string()).collect(),
            lock_text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub description: String,
    pub puzzles: Vec<Puzzle>,
    pub hints: Vec<Hint>,
    exits: BTreeMap<Direction, Exit>,
}

impl Room {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            puzzles: Vec::new(),
            hints: Vec::new(),
            exits: BTreeMap::new(),
        }
    }

    pub fn with_puzzle(mut self, puzzle: Puzzle) -> Self {
        self.puzzles.push(puzzle);
        self
    }

    pub fn with_hint(mut self, hint: Hint) -> Self {
        self.hints.push(hint);
        self.hints.sort_by_key(|h| h.level);
        self
    }

    pub fn with_exit(mut self, direction: Direction, target_room: &str) -> Self {
        self.exits.insert(direction, Exit::open(target_room));
        self
    }

    pub fn with_locked_exit(
        mut self,
        direction: Direction,
        target_room: &str,
        gating_puzzles: &[&str],
        lock_text: &str,
    ) -> Self {
        self.exits
            .insert(direction, Exit::locked(target_room, gating_puzzles, lock_text));
        self
    }

    pub fn set_exit(&mut self, direction: Direction, exit: Exit) {
        self.exits.insert(direction, exit);
    }

    pub fn exit(&self, direction: Direction) -> Option<&Exit> {
        self.exits.get(&direction)
    }

    pub fn exits(&self) -> impl Iterator<Item = (Direction, &Exit)> {
        self.exits.iter().map(|(d, e)| (*d, e))
    }

    /// First exit (in direction order) leading to `target_room`.
    pub fn exit_to(&self, target_room: &str) -> Option<(Direction, &Exit)> {
        self.exits().find(|(_, e)| e.target_room == target_room)
    }

    pub fn open_exits(&self) -> Vec<Direction> {
        self.exits().filter(|(_, e)| !e.locked).map(|(d, _)| d).collect()
    }

    pub fn locked_exits(&self) -> Vec<Direction> {
        self.exits().filter(|(_, e)| e.locked).map(|(d, _)| d).collect()
    }

    pub fn puzzle(&self, puzzle_id: &str) -> Option<&Puzzle> {
        self.puzzles.iter().find(|p| p.id == puzzle_id)
    }

    pub fn puzzle_mut(&mut self, puzzle_id: &str) -> Option<&mut Puzzle> {
        self.puzzles.iter_mut().find(|p| p.id == puzzle_id)
    }

    /// True when every puzzle in the room is solved (vacuously for empty rooms).
    pub fn is_complete(&self) -> bool {
        self.puzzles.iter().all(Puzzle::is_solved)
    }

    /// Whether an exit may be passed: unlocked, or every gating puzzle is solved.
    pub fn gate_satisfied(&self, exit: &Exit) -> bool {
        if !exit.locked {
            return true;
        }
        if exit.gating_puzzles.is_empty() {
            return self.is_complete();
        }
        exit.gating_puzzles
            .iter()
            .all(|id| self.puzzle(id).is_some_and(Puzzle::is_solved))
    }

    /// Clear the lock on every exit leading to `target_room`. Returns true if any
    /// exit changed; unlocking twice is a no-op.
    pub fn unlock(&mut self, target_room: &str) -> bool {
        let mut changed = false;
        for exit in self.exits.values_mut() {
            if exit.target_room == target_room && exit.locked {
                exit.locked = false;
                changed = true;
            }
        }
        changed
    }

    /// Lock the exit in `direction`. Returns false when there is no such exit.
    pub fn lock(&mut self, direction: Direction) -> bool {
        match self.exits.get_mut(&direction) {
            Some(exit) => {
                exit.locked = true;
                if exit.lock_text.is_empty() {
                    exit.lock_text = DEFAULT_LOCK_TEXT.to_string();
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::puzzle::{CodePuzzle, PuzzleKind};

    fn room() -> Room {
        Room::new("hall", "Hall", "A draughty hall.")
            .with_puzzle(Puzzle::new("p1", "Door", PuzzleKind::Code(CodePuzzle::default())))
            .with_puzzle(Puzzle::new("p2", "Chest", PuzzleKind::Code(CodePuzzle::default())))
            .with_exit(Direction::West, "cellar")
            .with_locked_exit(Direction::North, "vault", &["p1"], "The vault door is shut.")
            .with_locked_exit(Direction::Up, "attic", &[], "")
    }

    #[test]
    fn gate_follows_named_puzzles() {
        let mut room = room();
        let north = room.exit(Direction::North).cloned().unwrap();
        assert!(!room.gate_satisfied(&north));
        room.puzzle_mut("p1").unwrap().enter_input("victory");
        assert!(room.gate_satisfied(&north));
    }

    #[test]
    fn empty_gate_means_whole_room() {
        let mut room = room();
        let up = room.exit(Direction::Up).cloned().unwrap();
        assert_eq!(up.lock_text, DEFAULT_LOCK_TEXT);
        room.puzzle_mut("p1").unwrap().enter_input("victory");
        assert!(!room.gate_satisfied(&up));
        room.puzzle_mut("p2").unwrap().enter_input("victory");
        assert!(room.gate_satisfied(&up));
        assert!(room.is_complete());
    }

    #[test]
    fn unlock_is_idempotent() {
        let mut room = room();
        assert!(room.unlock("vault"));
        assert!(!room.unlock("vault"));
        assert!(!room.exit(Direction::North).unwrap().locked);
        assert!(!room.unlock("nowhere"));
    }

    #[test]
    fn lock_and_listing() {
        let mut room = room();
        assert_eq!(room.open_exits(), vec![Direction::West]);
        assert!(room.lock(Direction::West));
        assert!(!room.lock(Direction::East));
        assert_eq!(
            room.locked_exits(),
            vec![Direction::North, Direction::West, Direction::Up]
        );
        assert_eq!(room.exit_to("vault").map(|(d, _)| d), Some(Direction::North));
    }
}
