//! # Storage Module - Data Persistence Layer
//!
//! File-backed persistence for escapade: player accounts, dungeon content,
//! the leaderboard and per-player save slots.
//!
//! ## Layout
//!
//! ```text
//! data/
//! ├── users.json          ← account records (Argon2id PHC hashes)
//! ├── dungeons.json       ← authored dungeon content
//! ├── leaderboard.json    ← best entry per player
//! └── progress/
//!     └── <player>/       ← percent-encoded player name
//!         └── <slot>.json
//! ```
//!
//! Every write goes through [`write_file_locked`]: the destination is locked
//! with `fs2`, the new content lands in a temp file in the same directory and
//! is renamed over the old file, so readers never see a half-written document.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use escapade::config::StorageConfig;
//! use escapade::storage::JsonStore;
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = JsonStore::new(&StorageConfig::default(), 600_000);
//!     store.ensure_dirs()?;
//!     let accounts = store.load_accounts()?;
//!     println!("{} accounts", accounts.len());
//!     Ok(())
//! }
//! ```

pub mod credentials;

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use fs2::FileExt;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use crate::config::StorageConfig;
use crate::game::dungeon::Dungeon;
use crate::game::facade::PersistenceHook;
use crate::game::leaderboard::Leaderboard;
use crate::game::progress::Progress;
use crate::game::seed_loader;
use crate::game::types::Account;
use crate::validation::{safe_filename, validate_slot_name};

pub use credentials::Credentials;

/// Content written by [`JsonStore::write_sample_dungeons`] on first run.
pub const SAMPLE_DUNGEONS: &str = include_str!("../../data/dungeons.json");

/// JSON documents under the configured data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    users_path: PathBuf,
    dungeons_path: PathBuf,
    leaderboard_path: PathBuf,
    progress_dir: PathBuf,
    default_budget_ms: u64,
}

impl JsonStore {
    pub fn new(config: &StorageConfig, default_budget_ms: u64) -> Self {
        Self {
            users_path: config.users_path(),
            dungeons_path: config.dungeons_path(),
            leaderboard_path: config.leaderboard_path(),
            progress_dir: config.progress_path(),
            default_budget_ms,
        }
    }

    /// Create the data and progress directories if they do not exist.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.users_path.parent(), Some(self.progress_dir.as_path())]
            .into_iter()
            .flatten()
        {
            fs::create_dir_all(dir)
                .map_err(|e| anyhow!("Failed to create data directory {}: {}", dir.display(), e))?;
        }
        Ok(())
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    pub fn dungeons_path(&self) -> &Path {
        &self.dungeons_path
    }

    /// All stored accounts. A missing file is an empty store.
    pub fn load_accounts(&self) -> Result<Vec<Account>> {
        Ok(read_json(&self.users_path)?.unwrap_or_default())
    }

    pub fn save_accounts(&self, accounts: &[Account]) -> Result<()> {
        let content = serde_json::to_string_pretty(accounts)
            .map_err(|e| anyhow!("Failed to serialize accounts: {}", e))?;
        write_file_locked(&self.users_path, &content)?;
        debug!("Saved {} accounts to {}", accounts.len(), self.users_path.display());
        Ok(())
    }

    /// Build every dungeon in the content file. A missing file yields none.
    pub fn load_dungeons(&self) -> Result<Vec<Dungeon>> {
        match fs::read_to_string(&self.dungeons_path) {
            Ok(data) => {
                let cleaned = data.trim_start_matches('\0');
                let dungeons = seed_loader::parse_dungeons(cleaned, self.default_budget_ms)
                    .map_err(|e| anyhow!("Failed to load {}: {}", self.dungeons_path.display(), e))?;
                info!("Loaded {} dungeons from {}", dungeons.len(), self.dungeons_path.display());
                Ok(dungeons)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No dungeon content at {}", self.dungeons_path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(anyhow!("Failed reading {}: {}", self.dungeons_path.display(), e)),
        }
    }

    /// Write the bundled sample content unless a content file already exists.
    /// Returns true when the file was written.
    pub fn write_sample_dungeons(&self) -> Result<bool> {
        if self.dungeons_path.exists() {
            return Ok(false);
        }
        self.ensure_dirs()?;
        write_file_locked(&self.dungeons_path, SAMPLE_DUNGEONS)?;
        info!("Wrote sample dungeons to {}", self.dungeons_path.display());
        Ok(true)
    }

    pub fn load_leaderboard(&self) -> Result<Leaderboard> {
        Ok(read_json(&self.leaderboard_path)?.unwrap_or_default())
    }

    pub fn save_leaderboard(&self, leaderboard: &Leaderboard) -> Result<()> {
        let content = serde_json::to_string_pretty(leaderboard)
            .map_err(|e| anyhow!("Failed to serialize leaderboard: {}", e))?;
        write_file_locked(&self.leaderboard_path, &content)
    }

    fn player_dir(&self, username: &str) -> PathBuf {
        self.progress_dir.join(safe_filename(&username.trim().to_lowercase()))
    }

    fn slot_path(&self, username: &str, slot: &str) -> Result<PathBuf> {
        let slot = validate_slot_name(slot).map_err(|e| anyhow!("{}", e))?;
        Ok(self.player_dir(username).join(format!("{}.json", slot)))
    }

    pub fn save_progress(&self, progress: &Progress) -> Result<()> {
        let path = self.slot_path(&progress.username, &progress.slot)?;
        let content = serde_json::to_string_pretty(progress)
            .map_err(|e| anyhow!("Failed to serialize progress: {}", e))?;
        write_file_locked(&path, &content)
    }

    pub fn load_progress(&self, username: &str, slot: &str) -> Result<Option<Progress>> {
        read_json(&self.slot_path(username, slot)?)
    }

    /// Slot names saved for a player, sorted.
    pub fn list_progress_slots(&self, username: &str) -> Result<Vec<String>> {
        let dir = self.player_dir(username);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(anyhow!("Failed reading {}: {}", dir.display(), e)),
        };
        let mut slots: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                if name.starts_with('.') {
                    return None;
                }
                name.strip_suffix(".json").map(str::to_string)
            })
            .collect();
        slots.sort();
        Ok(slots)
    }
}

impl PersistenceHook for JsonStore {
    fn save_accounts(&self, accounts: &[Account]) -> Result<()> {
        JsonStore::save_accounts(self, accounts)
    }

    fn save_progress(&self, progress: &Progress) -> Result<()> {
        JsonStore::save_progress(self, progress)
    }

    fn save_leaderboard(&self, leaderboard: &Leaderboard) -> Result<()> {
        JsonStore::save_leaderboard(self, leaderboard)
    }

    fn load_progress(&self, username: &str, slot: &str) -> Result<Option<Progress>> {
        JsonStore::load_progress(self, username, slot)
    }
}

/// Read and decode a JSON document; `None` when the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path) {
        Ok(data) => {
            // Guard against any accidental leading NULs
            let cleaned = data.trim_start_matches('\0');
            if cleaned.trim().is_empty() {
                return Ok(None);
            }
            let value = serde_json::from_str(cleaned)
                .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow!("Failed reading {}: {}", path.display(), e)),
    }
}

/// Replace `path` with `content` atomically while holding an exclusive lock.
pub fn write_file_locked(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    // Open (or create) the destination so the lock has something to hold
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)?;

    lock_file.lock_exclusive()?;

    let base = path.file_name().and_then(|s| s.to_str()).unwrap_or("data.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                tmp.write_all(content.as_bytes())?;
                tmp.flush()?;
                let _ = tmp.sync_all();
                break candidate;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
                continue;
            }
            Err(e) => return Err(anyhow!("Failed to create temp file for atomic write: {}", e)),
        }
    };

    fs::rename(&tmp_path, path)?;

    // Persist the rename (best-effort)
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }

    drop(lock_file);
    Ok(())
}
