//! Explored / completed room tracking for one dungeon session.
use serde::{Deserialize, Serialize};

use crate::game::room::Room;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonMap {
    explored: Vec<String>,
    completed: Vec<String>,
}

impl DungeonMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit. Returns true the first time a room is seen.
    pub fn explore(&mut self, room_id: &str) -> bool {
        if self.is_explored(room_id) {
            return false;
        }
        self.explored.push(room_id.to_string());
        true
    }

    pub fn is_explored(&self, room_id: &str) -> bool {
        self.explored.iter().any(|r| r == room_id)
    }

    pub fn is_completed(&self, room_id: &str) -> bool {
        self.completed.iter().any(|r| r == room_id)
    }

    /// Recompute completion from puzzle state: an explored room whose puzzles are
    /// all solved. Returns ids that became completed by this call.
    pub fn refresh(&mut self, rooms: &[Room]) -> Vec<String> {
        let mut newly = Vec::new();
        for room in rooms {
            if self.is_explored(&room.id) && room.is_complete() && !self.is_completed(&room.id) {
                self.completed.push(room.id.clone());
                newly.push(room.id.clone());
            }
        }
        newly
    }

    pub fn explored(&self) -> &[String] {
        &self.explored
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn clear(&mut self) {
        self.explored.clear();
        self.completed.clear();
    }

    /// One line per room: `[x]` completed, `[~]` explored, `[ ]` unknown.
    pub fn summary(&self, rooms: &[Room]) -> Vec<String> {
        rooms
            .iter()
            .map(|room| {
                let mark = if self.is_completed(&room.id) {
                    "[x]"
                } else if self.is_explored(&room.id) {
                    "[~]"
                } else {
                    "[ ]"
                };
                if self.is_explored(&room.id) {
                    format!("{} {}", mark, room.name)
                } else {
                    format!("{} ???", mark)
                }
            })
            .collect()
    }
}
