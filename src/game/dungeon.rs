//! Dungeon: owns the rooms of one play session, the session [`Timer`] and the
//! room-transition rules.
//!
//! Rooms are addressed by index internally, so the current/previous pointers
//! always name a member of `rooms`. Transitions are checked in full before any
//! state changes; a blocked move leaves the dungeon exactly as it was.

use std::collections::{BTreeSet, VecDeque};

use log::{debug, info};

use crate::game::achievement::Achievement;
use crate::game::errors::GameError;
use crate::game::map::DungeonMap;
use crate::game::progress::Progress;
use crate::game::puzzle::Puzzle;
use crate::game::room::{Exit, Room};
use crate::game::timer::Timer;
use crate::game::types::{Difficulty, DifficultySettings, Direction, DEFAULT_TIME_BUDGET_MS};

/// Outcome of a room transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomChange {
    /// Moved; carries the id of the room now occupied.
    Entered(String),
    /// Already standing in the requested room.
    Stayed,
    /// Not allowed; carries the lock text or the rule that stopped the move.
    Blocked(String),
    /// No exit in that direction, or no room with that id.
    NoRoute,
    /// The dungeon has not been entered.
    NotStarted,
}

impl RoomChange {
    pub fn entered(&self) -> bool {
        matches!(self, RoomChange::Entered(_))
    }
}

#[derive(Debug, Clone)]
pub struct Dungeon {
    pub id: String,
    pub name: String,
    pub description: String,
    rooms: Vec<Room>,
    start: usize,
    current: Option<usize>,
    previous: Option<usize>,
    difficulty: Difficulty,
    base_time_budget_ms: u64,
    time_budget_ms: u64,
    moves: u32,
    timer: Timer,
    map: DungeonMap,
    pub achievements: Vec<Achievement>,
}

impl Dungeon {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            rooms: Vec::new(),
            start: 0,
            current: None,
            previous: None,
            difficulty: Difficulty::default(),
            base_time_budget_ms: DEFAULT_TIME_BUDGET_MS,
            time_budget_ms: Difficulty::default().time_budget_ms(DEFAULT_TIME_BUDGET_MS),
            moves: 0,
            timer: Timer::new(),
            map: DungeonMap::new(),
            achievements: Vec::new(),
        }
    }

    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Choose the starting room by id. Unknown ids leave the first room as start.
    pub fn with_start_room(mut self, room_id: &str) -> Self {
        if let Some(index) = self.room_index(room_id) {
            self.start = index;
        }
        self
    }

    pub fn with_base_time_budget_ms(mut self, base_ms: u64) -> Self {
        self.base_time_budget_ms = base_ms;
        self.time_budget_ms = self.difficulty.time_budget_ms(base_ms);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.set_difficulty(difficulty);
        self
    }

    pub fn with_achievement(mut self, achievement: Achievement) -> Self {
        self.achievements.push(achievement);
        self
    }

    /// Check the object graph for dangling references.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.rooms.is_empty() {
            return Err(GameError::InvalidConfiguration(format!(
                "dungeon '{}' has no rooms",
                self.id
            )));
        }
        let mut room_ids = BTreeSet::new();
        let mut puzzle_ids = BTreeSet::new();
        for room in &self.rooms {
            if !room_ids.insert(room.id.as_str()) {
                return Err(GameError::InvalidConfiguration(format!(
                    "dungeon '{}' has duplicate room id '{}'",
                    self.id, room.id
                )));
            }
            for puzzle in &room.puzzles {
                if !puzzle_ids.insert(puzzle.id.as_str()) {
                    return Err(GameError::InvalidConfiguration(format!(
                        "dungeon '{}' has duplicate puzzle id '{}'",
                        self.id, puzzle.id
                    )));
                }
            }
        }
        for room in &self.rooms {
            for (direction, exit) in room.exits() {
                if !room_ids.contains(exit.target_room.as_str()) {
                    return Err(GameError::InvalidConfiguration(format!(
                        "room '{}' exit {} leads to unknown room '{}'",
                        room.id, direction, exit.target_room
                    )));
                }
                if let Some(missing) = exit.gating_puzzles.iter().find(|p| room.puzzle(p).is_none()) {
                    return Err(GameError::InvalidConfiguration(format!(
                        "room '{}' exit {} is gated on unknown puzzle '{}'",
                        room.id, direction, missing
                    )));
                }
            }
        }
        for achievement in &self.achievements {
            if !puzzle_ids.contains(achievement.puzzle_id.as_str()) {
                return Err(GameError::InvalidConfiguration(format!(
                    "achievement '{}' refers to unknown puzzle '{}'",
                    achievement.id, achievement.puzzle_id
                )));
            }
        }
        Ok(())
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == room_id)
    }

    pub fn room_mut(&mut self, room_id: &str) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id == room_id)
    }

    pub fn room_index(&self, room_id: &str) -> Option<usize> {
        self.rooms.iter().position(|r| r.id == room_id)
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.rooms.get(self.current?)
    }

    pub fn current_room_mut(&mut self) -> Option<&mut Room> {
        let index = self.current?;
        self.rooms.get_mut(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn previous_room(&self) -> Option<&Room> {
        self.rooms.get(self.previous?)
    }

    pub fn starting_room(&self) -> Option<&Room> {
        self.rooms.get(self.start)
    }

    /// Puzzle in the current room.
    pub fn current_puzzle_mut(&mut self, puzzle_id: &str) -> Option<&mut Puzzle> {
        self.current_room_mut()?.puzzle_mut(puzzle_id)
    }

    pub fn puzzle(&self, puzzle_id: &str) -> Option<&Puzzle> {
        self.rooms.iter().find_map(|r| r.puzzle(puzzle_id))
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn settings(&self) -> DifficultySettings {
        self.difficulty.settings()
    }

    /// Change difficulty and recompute the time budget. Elapsed time is untouched.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.time_budget_ms = difficulty.time_budget_ms(self.base_time_budget_ms);
        debug!(
            "Dungeon {} difficulty {} (budget {} ms)",
            self.id, difficulty, self.time_budget_ms
        );
    }

    pub fn base_time_budget_ms(&self) -> u64 {
        self.base_time_budget_ms
    }

    pub fn time_budget_ms(&self) -> u64 {
        self.time_budget_ms
    }

    pub fn time_remaining_ms(&self) -> u64 {
        self.time_budget_ms.saturating_sub(self.timer.elapsed_ms())
    }

    pub fn is_time_up(&self) -> bool {
        self.timer.has_started() && self.time_remaining_ms() == 0
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn map(&self) -> &DungeonMap {
        &self.map
    }

    /// Re-derive completed rooms; returns rooms completed since the last call.
    pub fn refresh_map(&mut self) -> Vec<String> {
        self.map.refresh(&self.rooms)
    }

    /// True once every room's puzzles are solved.
    pub fn is_complete(&self) -> bool {
        !self.rooms.is_empty() && self.rooms.iter().all(Room::is_complete)
    }

    /// Place the player in the starting room and start the clock.
    pub fn enter(&mut self) -> Option<&Room> {
        if self.rooms.is_empty() {
            return None;
        }
        self.current = Some(self.start);
        self.previous = None;
        self.moves = 0;
        self.map.clear();
        self.map.explore(&self.rooms[self.start].id);
        self.timer.start();
        info!("Entered dungeon {} at room {}", self.id, self.rooms[self.start].id);
        self.current_room()
    }

    /// Stop the clock and drop the room pointers.
    pub fn leave(&mut self) {
        self.timer.stop();
        self.current = None;
        self.previous = None;
        info!("Left dungeon {}", self.id);
    }

    /// Clear the lock on every exit, in any room, leading to `target_room`.
    pub fn unlock(&mut self, target_room: &str) -> bool {
        let mut changed = false;
        for room in &mut self.rooms {
            changed |= room.unlock(target_room);
        }
        changed
    }

    /// Walk through the exit in `direction` of the current room.
    pub fn change_room(&mut self, direction: Direction) -> RoomChange {
        let Some(current) = self.current else {
            return RoomChange::NotStarted;
        };
        let room = &self.rooms[current];
        let Some(exit) = room.exit(direction) else {
            return RoomChange::NoRoute;
        };
        if !room.gate_satisfied(exit) {
            return RoomChange::Blocked(exit.lock_text.clone());
        }
        let target_id = exit.target_room.clone();
        let Some(target) = self.room_index(&target_id) else {
            return RoomChange::NoRoute;
        };
        self.move_to(target, Some(current))
    }

    /// Move to a room by id.
    ///
    /// Rooms joined to the current room by an exit follow that exit's gate.
    /// Other rooms are allowed when already explored, or when a chain of
    /// passable exits leads there from a room the player has explored.
    pub fn enter_room(&mut self, room_id: &str) -> RoomChange {
        let Some(current) = self.current else {
            return RoomChange::NotStarted;
        };
        let Some(target) = self.room_index(room_id) else {
            return RoomChange::NoRoute;
        };
        if target == current {
            return RoomChange::Stayed;
        }

        let here = &self.rooms[current];
        let local: Vec<&Exit> = here
            .exits()
            .filter(|(_, e)| e.target_room == room_id)
            .map(|(_, e)| e)
            .collect();
        if !local.is_empty() {
            if local.iter().any(|e| here.gate_satisfied(e)) {
                return self.move_to(target, Some(current));
            }
            return RoomChange::Blocked(local[0].lock_text.clone());
        }

        if !self.map.is_explored(room_id) && !self.reachable_from_explored(target) {
            return match self.sealed_by(room_id) {
                Some(lock_text) => RoomChange::Blocked(lock_text),
                None => RoomChange::NoRoute,
            };
        }
        self.move_to(target, None)
    }

    /// Return to the previous room when the difficulty allows undo.
    pub fn go_back(&mut self) -> RoomChange {
        if self.current.is_none() {
            return RoomChange::NotStarted;
        }
        if !self.settings().undo_allowed {
            return RoomChange::Blocked(format!(
                "Going back is not allowed on {} difficulty.",
                self.difficulty
            ));
        }
        let Some(previous) = self.previous else {
            return RoomChange::NoRoute;
        };
        self.move_to(previous, None)
    }

    /// Replace session state with a saved snapshot.
    pub fn restore(&mut self, progress: &Progress) -> Result<(), GameError> {
        if progress.dungeon_id != self.id {
            return Err(GameError::Validation(format!(
                "progress belongs to dungeon '{}', not '{}'",
                progress.dungeon_id, self.id
            )));
        }
        let current = match progress.current_room_id.as_deref() {
            Some(id) => Some(
                self.room_index(id)
                    .ok_or_else(|| GameError::NotFound(format!("room '{}'", id)))?,
            ),
            None => None,
        };

        for room in &mut self.rooms {
            for puzzle in &mut room.puzzles {
                puzzle.reset();
                if let Some(state) = progress.puzzle_states.get(&puzzle.id) {
                    puzzle.restore_state(*state);
                }
                if let Some(used) = progress.hints_used.get(&puzzle.id) {
                    puzzle.restore_hints_used(*used);
                }
            }
        }
        self.set_difficulty(progress.difficulty);
        self.current = current;
        self.previous = None;
        self.moves = progress.moves;
        self.map.clear();
        for id in &progress.explored_rooms {
            if self.room_index(id).is_some() {
                self.map.explore(id);
            }
        }
        if let Some(index) = current {
            self.map.explore(&self.rooms[index].id);
        }
        self.map.refresh(&self.rooms);

        self.timer.start();
        self.timer.add_penalty(progress.elapsed_ms);
        if current.is_none() {
            self.timer.stop();
        }
        info!(
            "Restored dungeon {} from slot {} ({} ms elapsed)",
            self.id, progress.slot, progress.elapsed_ms
        );
        Ok(())
    }

    /// Breadth-first walk over passable exits, seeded with every explored room.
    fn reachable_from_explored(&self, target: usize) -> bool {
        let mut seen: Vec<bool> = self
            .rooms
            .iter()
            .map(|r| self.map.is_explored(&r.id))
            .collect();
        let mut queue: VecDeque<usize> = (0..self.rooms.len()).filter(|i| seen[*i]).collect();
        while let Some(index) = queue.pop_front() {
            if index == target {
                return true;
            }
            let room = &self.rooms[index];
            for (_, exit) in room.exits() {
                if !room.gate_satisfied(exit) {
                    continue;
                }
                if let Some(next) = self.room_index(&exit.target_room) {
                    if !seen[next] {
                        seen[next] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        false
    }

    /// Lock text of the first unsatisfied locked exit into `room_id`.
    fn sealed_by(&self, room_id: &str) -> Option<String> {
        self.rooms.iter().find_map(|room| {
            room.exits()
                .find(|(_, e)| e.target_room == room_id && !room.gate_satisfied(e))
                .map(|(_, e)| e.lock_text.clone())
        })
    }

    fn move_to(&mut self, target: usize, unlock_from: Option<usize>) -> RoomChange {
        let limit = self.settings().max_moves;
        if self.moves >= limit {
            return RoomChange::Blocked(format!(
                "You have used all {} room moves allowed on {} difficulty.",
                limit, self.difficulty
            ));
        }
        let target_id = self.rooms[target].id.clone();
        if let Some(from) = unlock_from {
            if self.rooms[from].unlock(&target_id) {
                debug!("Unlocked exit {} -> {}", self.rooms[from].id, target_id);
            }
        }
        self.previous = self.current;
        self.current = Some(target);
        self.moves += 1;
        self.map.explore(&target_id);
        debug!(
            "Dungeon {} move {} -> room {}",
            self.id, self.moves, target_id
        );
        RoomChange::Entered(target_id)
    }
}
