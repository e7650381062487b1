//! # Escapade - Escape-Room Dungeon Engine
//!
//! Escapade models a single-player escape room: the player walks a dungeon of
//! rooms, solves the puzzles that seal each exit, collects reward items and
//! races a difficulty-scaled clock for a place on the leaderboard.
//!
//! ## Features
//!
//! - **Six puzzle kinds**: code, riddle, word scramble, shape matching, sliding
//!   shapes and grid mazes, all behind one state machine.
//! - **Gated navigation**: exits stay sealed until their puzzles are solved;
//!   difficulty limits moves, undo and hint frequency.
//! - **Timer with penalties**: pause/resume and hint time costs on one session clock.
//! - **Inventory gating**: puzzles that need an item never see input without it.
//! - **Rankings**: a deterministic leaderboard (score, time, submission order)
//!   and an account-score ranking.
//! - **Save slots**: snapshot and restore a session.
//! - **Security**: Argon2id password hashing and validated player names.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use escapade::config::Config;
//! use escapade::game::{AccountRepository, DungeonRepository, EscapeFacade};
//! use escapade::storage::JsonStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store = JsonStore::new(&config.storage, config.game.base_time_budget_ms);
//!     let accounts = Arc::new(AccountRepository::from_accounts(store.load_accounts()?));
//!     let dungeons = Arc::new(DungeonRepository::from_dungeons(store.load_dungeons()?));
//!
//!     let mut facade = EscapeFacade::from_config(&config, accounts, dungeons)
//!         .with_leaderboard(store.load_leaderboard()?)
//!         .with_persistence(Box::new(store));
//!     if facade.login("alice", "correct horse") && facade.start_dungeon("manor") {
//!         facade.enter_dungeon();
//!         facade.answer_riddle("sphinx", "piano");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - puzzles, rooms, dungeons, leaderboard and the [`game::EscapeFacade`]
//! - [`storage`] - JSON persistence and password hashing
//! - [`config`] - configuration management and validation
//! - [`validation`] - player name, password and save-slot validation
//! - [`logutil`] - log-safe rendering of user input
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  EscapeFacade   │ ← session orchestration
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Dungeon / Room  │ ← navigation, timer, puzzles
//! │ / Puzzle        │
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Storage       │ ← JSON files behind PersistenceHook
//! └─────────────────┘
//! ```

pub mod config;
pub mod game;
pub mod logutil;
pub mod storage;
pub mod validation;
