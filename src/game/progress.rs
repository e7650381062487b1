//! Save slots for in-dungeon progress.
//!
//! A [`Progress`] is a plain snapshot. [`ProgressManager`] stores and returns
//! independent copies, so a caller mutating a loaded snapshot never changes the
//! stored slot.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::dungeon::Dungeon;
use crate::game::errors::GameError;
use crate::game::inventory::Inventory;
use crate::game::types::{Difficulty, PuzzleState};
use crate::validation::validate_slot_name;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub username: String,
    pub dungeon_id: String,
    pub current_room_id: Option<String>,
    pub puzzle_states: BTreeMap<String, PuzzleState>,
    /// Hints already taken, by puzzle id. Puzzles without hints are omitted.
    #[serde(default)]
    pub hints_used: BTreeMap<String, u32>,
    pub elapsed_ms: u64,
    pub slot: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub explored_rooms: Vec<String>,
    #[serde(default)]
    pub moves: u32,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub score: u64,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

impl Progress {
    /// Snapshot the dungeon's position, puzzle states and clock.
    pub fn capture(username: &str, dungeon: &Dungeon, slot: &str) -> Self {
        let puzzle_states = dungeon
            .rooms()
            .iter()
            .flat_map(|room| room.puzzles.iter())
            .map(|p| (p.id.clone(), p.state()))
            .collect();
        let hints_used = dungeon
            .rooms()
            .iter()
            .flat_map(|room| room.puzzles.iter())
            .filter(|p| p.hints_used() > 0)
            .map(|p| (p.id.clone(), p.hints_used()))
            .collect();
        Self {
            username: username.to_string(),
            dungeon_id: dungeon.id.clone(),
            current_room_id: dungeon.current_room().map(|r| r.id.clone()),
            puzzle_states,
            hints_used,
            elapsed_ms: dungeon.timer().elapsed_ms(),
            slot: slot.to_string(),
            difficulty: dungeon.difficulty(),
            explored_rooms: dungeon.map().explored().to_vec(),
            moves: dungeon.moves(),
            inventory: Inventory::new(),
            score: 0,
            saved_at: Utc::now(),
        }
    }
}

/// In-memory slot table keyed by `(username, slot)`.
#[derive(Debug, Default)]
pub struct ProgressManager {
    slots: BTreeMap<(String, String), Progress>,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of `progress` under its own username and slot.
    pub fn save(&mut self, progress: &Progress) -> Result<(), GameError> {
        let slot = validate_slot_name(&progress.slot)
            .map_err(|e| GameError::Validation(e.to_string()))?;
        let mut stored = progress.clone();
        stored.slot = slot.clone();
        self.slots.insert((key(&progress.username), slot), stored);
        Ok(())
    }

    /// A copy of the stored slot.
    pub fn load(&self, username: &str, slot: &str) -> Option<Progress> {
        self.slots
            .get(&(key(username), slot.trim().to_string()))
            .cloned()
    }

    /// Slot names saved for `username`, sorted.
    pub fn list_slots(&self, username: &str) -> Vec<String> {
        let user = key(username);
        self.slots
            .keys()
            .filter(|(u, _)| *u == user)
            .map(|(_, slot)| slot.clone())
            .collect()
    }

    pub fn delete(&mut self, username: &str, slot: &str) -> bool {
        self.slots
            .remove(&(key(username), slot.trim().to_string()))
            .is_some()
    }
}

fn key(username: &str) -> String {
    username.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(slot: &str) -> Progress {
        Progress {
            username: "alice".into(),
            dungeon_id: "d1".into(),
            current_room_id: Some("hall".into()),
            puzzle_states: BTreeMap::from([("p1".to_string(), PuzzleState::Solved)]),
            hints_used: BTreeMap::from([("p1".to_string(), 1)]),
            elapsed_ms: 42_000,
            slot: slot.into(),
            difficulty: Difficulty::Hard,
            explored_rooms: vec!["hall".into()],
            moves: 3,
            inventory: Inventory::new(),
            score: 90,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn load_returns_equal_copy() {
        let mut manager = ProgressManager::new();
        let original = snapshot("s1");
        manager.save(&original).unwrap();

        let mut loaded = manager.load("alice", "s1").unwrap();
        assert_eq!(loaded, original);
        loaded.elapsed_ms = 0;
        assert_eq!(manager.load("ALICE", "s1").unwrap().elapsed_ms, 42_000);
    }

    #[test]
    fn slots_are_listed_and_deleted() {
        let mut manager = ProgressManager::new();
        manager.save(&snapshot("b")).unwrap();
        manager.save(&snapshot("a")).unwrap();
        assert_eq!(manager.list_slots("alice"), vec!["a", "b"]);
        assert!(manager.delete("alice", "a"));
        assert!(!manager.delete("alice", "a"));
        assert!(manager.load("alice", "a").is_none());
        assert!(manager.list_slots("bob").is_empty());
    }

    #[test]
    fn invalid_slot_names_are_rejected() {
        let mut manager = ProgressManager::new();
        assert!(manager.save(&snapshot("../escape")).is_err());
        assert!(manager.save(&snapshot("")).is_err());
    }
}
