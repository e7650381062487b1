//! # Escape facade
//!
//! [`EscapeFacade`] is the single entry point a front end talks to. It keeps
//! the logged-in account, the active dungeon session and the leaderboard, and
//! it coordinates every player intent:
//!
//! - account lifecycle: [`register`](EscapeFacade::register),
//!   [`login`](EscapeFacade::login), [`logout`](EscapeFacade::logout)
//! - dungeon lifecycle: [`start_dungeon`](EscapeFacade::start_dungeon),
//!   [`enter_dungeon`](EscapeFacade::enter_dungeon),
//!   [`exit_dungeon`](EscapeFacade::exit_dungeon),
//!   [`choose_difficulty`](EscapeFacade::choose_difficulty)
//! - navigation: [`enter_room`](EscapeFacade::enter_room),
//!   [`next_room`](EscapeFacade::next_room), [`previous_room`](EscapeFacade::previous_room),
//!   [`move_direction`](EscapeFacade::move_direction), [`go_back`](EscapeFacade::go_back)
//! - one answer method per puzzle kind, hints and timer control
//!
//! Nothing here returns an error. Missed lookups come back as `None`/`false`,
//! gameplay rejections as [`ValidationResult`] or [`RoomChange::Blocked`], and
//! persistence failures are logged and dropped.
//!
//! Each session owns a clone of the dungeon template together with its own
//! timer and inventory, so two facades sharing the same registries never see
//! each other's play state.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::{Config, GameConfig};
use crate::game::achievement::{award_achievement, earned_achievements, pending_achievements, Achievement};
use crate::game::dungeon::{Dungeon, RoomChange};
use crate::game::inventory::{format_inventory_compact, Inventory};
use crate::game::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::game::progress::{Progress, ProgressManager};
use crate::game::puzzle::{Puzzle, PuzzleType};
use crate::game::registry::{AccountRepository, DungeonRepository, DungeonSummary, PlayerScore};
use crate::game::room::Room;
use crate::game::types::{Account, Difficulty, Direction, Hint, PuzzleState, ValidationResult};
use crate::logutil::{escape_log, escape_preview};
use crate::storage::Credentials;
use crate::validation::{validate_password, validate_player_name};

macro_rules! sec_log {
    ($($arg:tt)*) => { log::warn!(target: "security", $($arg)*); };
}

/// Slot written after every solve.
pub const AUTOSAVE_SLOT: &str = "autosave";

/// Save calls the facade makes after it mutates persistent state.
///
/// Implementations report failures; the facade logs them and carries on.
pub trait PersistenceHook: Send + Sync {
    fn save_accounts(&self, accounts: &[Account]) -> anyhow::Result<()>;

    fn save_progress(&self, progress: &Progress) -> anyhow::Result<()>;

    fn save_leaderboard(&self, leaderboard: &Leaderboard) -> anyhow::Result<()>;

    /// Fallback used when a slot is not in the in-memory table.
    fn load_progress(&self, _username: &str, _slot: &str) -> anyhow::Result<Option<Progress>> {
        Ok(None)
    }
}

/// Answer to a hint request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintResponse {
    Given(Hint),
    /// Another hint is allowed after `wait` more session time.
    CoolingDown { wait: Duration },
    /// The puzzle has no hints left.
    Exhausted,
    /// No active session or no such puzzle in the current room.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitView {
    pub direction: Direction,
    pub target_room: String,
    /// False while the exit's gate is unsatisfied.
    pub passable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleView {
    pub id: String,
    pub title: String,
    pub kind: PuzzleType,
    pub state: PuzzleState,
    pub question: String,
    pub hints_remaining: u32,
    pub required_item: Option<String>,
}

impl From<&Puzzle> for PuzzleView {
    fn from(puzzle: &Puzzle) -> Self {
        Self {
            id: puzzle.id.clone(),
            title: puzzle.title.clone(),
            kind: puzzle.puzzle_type(),
            state: puzzle.state(),
            question: puzzle.question(),
            hints_remaining: puzzle.hints_remaining(),
            required_item: puzzle.requirement.required_key().map(str::to_string),
        }
    }
}

/// Read-only room snapshot for front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub current: bool,
    pub explored: bool,
    pub completed: bool,
    pub exits: Vec<ExitView>,
    pub puzzles: Vec<PuzzleView>,
}

impl RoomView {
    fn build(dungeon: &Dungeon, room: &Room) -> Self {
        let current = dungeon.current_room().is_some_and(|r| r.id == room.id);
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            description: room.description.clone(),
            current,
            explored: dungeon.map().is_explored(&room.id),
            completed: room.is_complete(),
            exits: room
                .exits()
                .map(|(direction, exit)| ExitView {
                    direction,
                    target_room: exit.target_room.clone(),
                    passable: room.gate_satisfied(exit),
                })
                .collect(),
            puzzles: room.puzzles.iter().map(PuzzleView::from).collect(),
        }
    }
}

#[derive(Debug)]
struct Session {
    dungeon: Dungeon,
    inventory: Inventory,
    score: u64,
    /// Session time at which the last hint was handed out.
    last_hint_at: Option<Duration>,
    completed: bool,
}

impl Session {
    fn new(dungeon: Dungeon) -> Self {
        Self {
            dungeon,
            inventory: Inventory::new(),
            score: 0,
            last_hint_at: None,
            completed: false,
        }
    }

    fn snapshot(&self, username: &str, slot: &str) -> Progress {
        let mut progress = Progress::capture(username, &self.dungeon, slot);
        progress.inventory = self.inventory.clone();
        progress.score = self.score;
        progress
    }
}

/// Points for one solve after hint deductions.
fn solve_points(game: &GameConfig, difficulty: Difficulty, hints_used: u32) -> u64 {
    let base = game.puzzle_points.for_difficulty(difficulty);
    let deduction = game.hint_point_cost.saturating_mul(u64::from(hints_used));
    base.saturating_sub(deduction).max(game.min_puzzle_points)
}

fn to_leaderboard_value(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub struct EscapeFacade {
    accounts: Arc<AccountRepository>,
    dungeons: Arc<DungeonRepository>,
    leaderboard: Leaderboard,
    progress: ProgressManager,
    persistence: Option<Box<dyn PersistenceHook>>,
    game: GameConfig,
    min_password_length: usize,
    credentials: Credentials,
    account: Option<String>,
    session: Option<Session>,
}

impl EscapeFacade {
    pub fn new(accounts: Arc<AccountRepository>, dungeons: Arc<DungeonRepository>) -> Self {
        Self::from_config(&Config::default(), accounts, dungeons)
    }

    pub fn from_config(
        config: &Config,
        accounts: Arc<AccountRepository>,
        dungeons: Arc<DungeonRepository>,
    ) -> Self {
        Self {
            accounts,
            dungeons,
            leaderboard: Leaderboard::new(),
            progress: ProgressManager::new(),
            persistence: None,
            game: config.game.clone(),
            min_password_length: config.security.min_password_length,
            credentials: Credentials::from_config(&config.security),
            account: None,
            session: None,
        }
    }

    pub fn with_leaderboard(mut self, leaderboard: Leaderboard) -> Self {
        self.leaderboard = leaderboard;
        self
    }

    pub fn with_persistence(mut self, hook: Box<dyn PersistenceHook>) -> Self {
        self.persistence = Some(hook);
        self
    }

    // ---- accounts ----

    /// Create an account. False when the name or password is rejected or the
    /// name is taken.
    pub fn register(&mut self, username: &str, password: &str) -> bool {
        let username = match validate_player_name(username) {
            Ok(name) => name,
            Err(e) => {
                debug!("Registration rejected for {}: {}", escape_log(username), e);
                return false;
            }
        };
        if let Err(e) = validate_password(password, self.min_password_length) {
            debug!("Registration rejected for {}: {}", escape_log(&username), e);
            return false;
        }
        if self.accounts.contains(&username) {
            debug!("Registration rejected for {}: name taken", escape_log(&username));
            return false;
        }
        let hash = match self.credentials.hash(password) {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Could not hash password for {}: {}", escape_log(&username), e);
                return false;
            }
        };
        if self.accounts.register(Account::new(&username, &hash)).is_err() {
            return false;
        }
        self.accounts.recompute_ranks();
        self.persist_accounts();
        true
    }

    /// Boolean credential check. On success the account becomes current and any
    /// previous session ends.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        let Some(account) = self.accounts.find(username) else {
            sec_log!("Login failed: unknown user {}", escape_log(username));
            return false;
        };
        if !self.credentials.verify(password, &account.password_hash) {
            sec_log!("Login failed: bad password for {}", escape_log(&account.username));
            return false;
        }
        self.end_session();
        info!("{} logged in", escape_log(&account.username));
        self.account = Some(account.username);
        true
    }

    /// End the session and forget the account. False when nobody was logged in.
    pub fn logout(&mut self) -> bool {
        self.end_session();
        match self.account.take() {
            Some(username) => {
                info!("{} logged out", escape_log(&username));
                true
            }
            None => false,
        }
    }

    pub fn current_username(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn current_account(&self) -> Option<Account> {
        self.accounts.find(self.account.as_deref()?)
    }

    // ---- dungeon lifecycle ----

    pub fn list_dungeons(&self) -> Vec<DungeonSummary> {
        self.dungeons.summaries()
    }

    /// Select a dungeon for a fresh session at the configured default
    /// difficulty. Requires a logged-in account.
    pub fn start_dungeon(&mut self, dungeon_id: &str) -> bool {
        if self.account.is_none() {
            return false;
        }
        let Some(mut dungeon) = self.dungeons.get(dungeon_id) else {
            debug!("No dungeon {}", escape_log(dungeon_id));
            return false;
        };
        self.end_session();
        dungeon.set_difficulty(self.game.default_difficulty);
        info!("Session started in dungeon {}", dungeon.id);
        self.session = Some(Session::new(dungeon));
        true
    }

    /// Walk into the selected dungeon: the clock starts and the player stands in
    /// the starting room.
    pub fn enter_dungeon(&mut self) -> Option<RoomView> {
        let session = self.session.as_mut()?;
        session.dungeon.enter()?;
        session.last_hint_at = None;
        let room = session.dungeon.current_room()?;
        Some(RoomView::build(&session.dungeon, room))
    }

    /// Drop the session. False when there was none.
    pub fn exit_dungeon(&mut self) -> bool {
        self.end_session()
    }

    pub fn choose_difficulty(&mut self, difficulty: Difficulty) -> bool {
        match self.session.as_mut() {
            Some(session) => {
                session.dungeon.set_difficulty(difficulty);
                true
            }
            None => false,
        }
    }

    fn end_session(&mut self) -> bool {
        match self.session.take() {
            Some(mut session) => {
                session.dungeon.leave();
                true
            }
            None => false,
        }
    }

    // ---- views ----

    pub fn view_rooms(&self) -> Vec<RoomView> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        session
            .dungeon
            .rooms()
            .iter()
            .map(|room| RoomView::build(&session.dungeon, room))
            .collect()
    }

    pub fn current_room(&self) -> Option<RoomView> {
        let session = self.session.as_ref()?;
        let room = session.dungeon.current_room()?;
        Some(RoomView::build(&session.dungeon, room))
    }

    pub fn view_puzzles(&self) -> Vec<PuzzleView> {
        self.current_room().map(|room| room.puzzles).unwrap_or_default()
    }

    /// Free room hints; reading them costs nothing.
    pub fn room_hints(&self) -> Vec<Hint> {
        self.session
            .as_ref()
            .and_then(|s| s.dungeon.current_room())
            .map(|room| room.hints.clone())
            .unwrap_or_default()
    }

    pub fn map_summary(&self) -> Vec<String> {
        self.session
            .as_ref()
            .map(|s| s.dungeon.map().summary(s.dungeon.rooms()))
            .unwrap_or_default()
    }

    // ---- navigation ----

    pub fn enter_room(&mut self, room_id: &str) -> RoomChange {
        match self.session.as_mut() {
            Some(session) => session.dungeon.enter_room(room_id),
            None => RoomChange::NotStarted,
        }
    }

    /// Move to the room after the current one in dungeon order, wrapping to the first.
    pub fn next_room(&mut self) -> RoomChange {
        self.step_room(1)
    }

    /// Move to the room before the current one in dungeon order, wrapping to the last.
    pub fn previous_room(&mut self) -> RoomChange {
        let len = self.session.as_ref().map_or(0, |s| s.dungeon.rooms().len());
        self.step_room(len.saturating_sub(1))
    }

    fn step_room(&mut self, offset: usize) -> RoomChange {
        let Some(session) = self.session.as_ref() else {
            return RoomChange::NotStarted;
        };
        let Some(index) = session.dungeon.current_index() else {
            return RoomChange::NotStarted;
        };
        let rooms = session.dungeon.rooms();
        let target = rooms[(index + offset) % rooms.len()].id.clone();
        self.enter_room(&target)
    }

    pub fn move_direction(&mut self, direction: Direction) -> RoomChange {
        match self.session.as_mut() {
            Some(session) => session.dungeon.change_room(direction),
            None => RoomChange::NotStarted,
        }
    }

    pub fn go_back(&mut self) -> RoomChange {
        match self.session.as_mut() {
            Some(session) => session.dungeon.go_back(),
            None => RoomChange::NotStarted,
        }
    }

    // ---- puzzles ----

    pub fn answer_riddle(&mut self, puzzle_id: &str, answer: &str) -> Option<ValidationResult> {
        self.attempt(puzzle_id, PuzzleType::Riddle, answer)
    }

    pub fn answer_scramble(&mut self, puzzle_id: &str, answer: &str) -> Option<ValidationResult> {
        self.attempt(puzzle_id, PuzzleType::WordScramble, answer)
    }

    pub fn attempt_code_puzzle(&mut self, puzzle_id: &str, code: &str) -> Option<ValidationResult> {
        self.attempt(puzzle_id, PuzzleType::Code, code)
    }

    /// `SLIDE <id>:<UP|DOWN|LEFT|RIGHT>` or `CHECK`.
    pub fn slide_shape(&mut self, puzzle_id: &str, command: &str) -> Option<ValidationResult> {
        self.attempt(puzzle_id, PuzzleType::SlideShape, command)
    }

    /// `label:x,y,deg;label:x,y,deg`.
    pub fn align_shapes(&mut self, puzzle_id: &str, placements: &str) -> Option<ValidationResult> {
        self.attempt(puzzle_id, PuzzleType::ShapeMatch, placements)
    }

    /// A direction token or an adjacent `row,col`.
    pub fn move_in_maze(&mut self, puzzle_id: &str, step: &str) -> Option<ValidationResult> {
        self.attempt(puzzle_id, PuzzleType::Maze, step)
    }

    /// Shared answer path. `None` when there is no active session or the
    /// current room has no puzzle of that kind with that id.
    fn attempt(&mut self, puzzle_id: &str, kind: PuzzleType, input: &str) -> Option<ValidationResult> {
        let username = self.account.clone()?;
        let session = self.session.as_mut()?;
        let time_up = session.dungeon.is_time_up();
        let puzzle = session.dungeon.current_room()?.puzzle(puzzle_id)?;
        if puzzle.puzzle_type() != kind {
            debug!("Puzzle {} is a {}, not a {}", puzzle_id, puzzle.puzzle_type(), kind);
            return None;
        }
        if time_up {
            return Some(ValidationResult::rejected(
                "Time is up. The dungeon no longer accepts answers.",
                puzzle.state(),
            ));
        }
        if let Some(key) = puzzle.requirement.required_key() {
            if !session.inventory.has(key) {
                return Some(ValidationResult::rejected(
                    format!("You need {} before you can try this.", key),
                    puzzle.state(),
                ));
            }
        }

        let was_solved = puzzle.is_solved();
        let puzzle = session.dungeon.current_puzzle_mut(puzzle_id)?;
        let result = puzzle.enter_input(input);
        debug!(
            "{} tried {} with '{}': {}",
            escape_log(&username),
            puzzle_id,
            escape_preview(input, 40),
            result.new_state
        );
        let newly_solved = !was_solved && puzzle.is_solved();
        if newly_solved {
            self.on_solved(&username, puzzle_id);
        }
        Some(result)
    }

    /// Reward, score, achievements, completion and saves for a first solve.
    fn on_solved(&mut self, username: &str, puzzle_id: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(puzzle) = session.dungeon.puzzle(puzzle_id) else {
            return;
        };
        let hints_used = puzzle.hints_used();
        let points = solve_points(&self.game, puzzle.difficulty, hints_used);
        if let Some(item) = puzzle.reward_item.clone() {
            session.inventory.add(&item);
            info!("{} received {}", escape_log(username), item);
        }
        session.score += points;
        info!(
            "{} solved {} for {} points (session score {})",
            escape_log(username),
            puzzle_id,
            points,
            session.score
        );

        let mut account_changed = false;
        let earned: Vec<Achievement> = match (self.accounts.find(username), session.dungeon.puzzle(puzzle_id)) {
            (Some(account), Some(puzzle)) => {
                let elapsed = session.dungeon.timer().elapsed();
                pending_achievements(&session.dungeon.achievements, &account, &session.dungeon.id, puzzle_id)
                    .into_iter()
                    .filter(|a| puzzle.check_achievement_condition(a, elapsed, hints_used, session.score))
                    .cloned()
                    .collect()
            }
            _ => Vec::new(),
        };
        for achievement in &earned {
            let awarded = self
                .accounts
                .with_account_mut(username, |account| award_achievement(account, achievement))
                .flatten();
            if let Some(bonus) = awarded {
                session.score += u64::from(bonus);
                account_changed = true;
                info!(
                    "{} unlocked achievement {} (+{})",
                    escape_log(username),
                    achievement.name,
                    bonus
                );
            }
        }

        for room in session.dungeon.refresh_map() {
            debug!("Room {} complete", room);
        }

        let mut leaderboard_changed = false;
        if session.dungeon.is_complete() && !session.completed {
            session.completed = true;
            session.dungeon.timer_mut().stop();
            let elapsed_ms = session.dungeon.timer().elapsed_ms();
            let outcome = self.leaderboard.submit(
                username,
                to_leaderboard_value(session.score),
                to_leaderboard_value(elapsed_ms),
            );
            info!(
                "{} escaped {} with {} points in {} ms ({:?})",
                escape_log(username),
                session.dungeon.id,
                session.score,
                elapsed_ms,
                outcome
            );
            if outcome.changed() {
                leaderboard_changed = true;
                let score = session.score;
                if self
                    .accounts
                    .with_account_mut(username, |account| account.ratchet_score(score))
                    .unwrap_or(false)
                {
                    account_changed = true;
                }
            }
        }

        let autosave = session.snapshot(username, AUTOSAVE_SLOT);
        if let Err(e) = self.progress.save(&autosave) {
            debug!("Autosave skipped: {}", e);
        }

        if account_changed {
            self.accounts.recompute_ranks();
            self.persist_accounts();
        }
        if leaderboard_changed {
            self.persist_leaderboard();
        }
        self.persist_progress(&autosave);
    }

    /// Hand out the next hint of a puzzle in the current room. The hint's time
    /// cost is added to the session timer; the difficulty's cooldown is measured
    /// on that same timer.
    pub fn request_hint(&mut self, puzzle_id: &str) -> HintResponse {
        let Some(session) = self.session.as_mut() else {
            return HintResponse::Unavailable;
        };
        if session.dungeon.current_room().and_then(|r| r.puzzle(puzzle_id)).is_none() {
            return HintResponse::Unavailable;
        }
        let cooldown = session.dungeon.settings().hint_cooldown;
        let now = session.dungeon.timer().elapsed();
        if let Some(last) = session.last_hint_at {
            let since = now.saturating_sub(last);
            if since < cooldown {
                return HintResponse::CoolingDown { wait: cooldown - since };
            }
        }
        let Some(puzzle) = session.dungeon.current_puzzle_mut(puzzle_id) else {
            return HintResponse::Unavailable;
        };
        let Some(hint) = puzzle.take_hint() else {
            return HintResponse::Exhausted;
        };
        let timer = session.dungeon.timer_mut();
        timer.add_penalty(hint.time_cost_ms);
        session.last_hint_at = Some(timer.elapsed());
        debug!("Hint {} for {} (+{} ms)", hint.level, puzzle_id, hint.time_cost_ms);
        HintResponse::Given(hint)
    }

    // ---- timer ----

    /// Stop the session clock. False (no-op) when it is not running.
    pub fn pause_timer(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.dungeon.timer().is_running() => {
                session.dungeon.timer_mut().stop();
                true
            }
            _ => false,
        }
    }

    /// Resume the session clock. False (no-op) when it is already running, the
    /// dungeon has not been entered, or the dungeon is finished.
    pub fn resume_timer(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session)
                if session.dungeon.is_active()
                    && !session.completed
                    && !session.dungeon.timer().is_running() =>
            {
                session.dungeon.timer_mut().un_pause();
                true
            }
            _ => false,
        }
    }

    pub fn time_remaining_ms(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.dungeon.time_remaining_ms())
    }

    pub fn elapsed_ms(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.dungeon.timer().elapsed_ms())
    }

    // ---- session state ----

    pub fn inventory_keys(&self) -> Vec<String> {
        self.session
            .as_ref()
            .map(|s| s.inventory.keys())
            .unwrap_or_default()
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        self.session.as_ref().map(|s| &s.inventory)
    }

    /// Numbered inventory listing for text front ends; empty without a session.
    pub fn view_inventory(&self) -> Vec<String> {
        self.session
            .as_ref()
            .map(|s| format_inventory_compact(&s.inventory))
            .unwrap_or_default()
    }

    pub fn session_score(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.score)
    }

    pub fn is_dungeon_complete(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.completed)
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.session.as_ref().map(|s| s.dungeon.difficulty())
    }

    /// Achievements the current account has unlocked.
    pub fn achievements(&self) -> Vec<Achievement> {
        self.current_account()
            .map(|account| earned_achievements(&account).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    // ---- rankings ----

    /// Account-driven ranking by current account score.
    pub fn get_top_players(&self, n: usize) -> Vec<PlayerScore> {
        self.accounts.top_players(n)
    }

    /// Competitive ranking: score, then time, then submission order.
    pub fn top_score(&self, n: usize) -> Vec<LeaderboardEntry> {
        self.leaderboard.top_score(n)
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    // ---- progress ----

    /// Snapshot the session into `slot`. False without a session or for an
    /// invalid slot name.
    pub fn save_progress(&mut self, slot: &str) -> bool {
        let (Some(username), Some(session)) = (self.account.as_deref(), self.session.as_ref()) else {
            return false;
        };
        let snapshot = session.snapshot(username, slot.trim());
        if let Err(e) = self.progress.save(&snapshot) {
            debug!("Save to slot {} rejected: {}", escape_log(slot), e);
            return false;
        }
        self.persist_progress(&snapshot);
        true
    }

    /// Replace the session with the snapshot in `slot`.
    pub fn load_progress(&mut self, slot: &str) -> bool {
        let Some(username) = self.account.clone() else {
            return false;
        };
        let snapshot = match self.progress.load(&username, slot.trim()) {
            Some(progress) => Some(progress),
            None => self.persistence.as_ref().and_then(|hook| {
                hook.load_progress(&username, slot.trim()).unwrap_or_else(|e| {
                    warn!("Failed to load slot {}: {}", escape_log(slot), e);
                    None
                })
            }),
        };
        let Some(snapshot) = snapshot else {
            return false;
        };
        let Some(mut dungeon) = self.dungeons.get(&snapshot.dungeon_id) else {
            warn!("Saved progress names unknown dungeon {}", escape_log(&snapshot.dungeon_id));
            return false;
        };
        if let Err(e) = dungeon.restore(&snapshot) {
            warn!("Could not restore slot {}: {}", escape_log(slot), e);
            return false;
        }
        self.end_session();
        let completed = dungeon.is_complete();
        if completed {
            dungeon.timer_mut().stop();
        }
        self.session = Some(Session {
            dungeon,
            inventory: snapshot.inventory.clone(),
            score: snapshot.score,
            last_hint_at: None,
            completed,
        });
        true
    }

    pub fn list_saves(&self) -> Vec<String> {
        self.account
            .as_deref()
            .map(|username| self.progress.list_slots(username))
            .unwrap_or_default()
    }

    // ---- persistence ----

    fn persist_accounts(&self) {
        if let Some(hook) = &self.persistence {
            if let Err(e) = hook.save_accounts(&self.accounts.snapshot()) {
                warn!("Failed to save accounts: {}", e);
            }
        }
    }

    fn persist_leaderboard(&self) {
        if let Some(hook) = &self.persistence {
            if let Err(e) = hook.save_leaderboard(&self.leaderboard) {
                warn!("Failed to save leaderboard: {}", e);
            }
        }
    }

    fn persist_progress(&self, progress: &Progress) {
        if let Some(hook) = &self.persistence {
            if let Err(e) = hook.save_progress(progress) {
                warn!("Failed to save progress slot {}: {}", progress.slot, e);
            }
        }
    }
}
