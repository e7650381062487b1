//! # Configuration Management Module
//!
//! Centralised, TOML-backed configuration for escapade.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - time budgets, default difficulty, scoring and leaderboard size
//! - [`StorageConfig`] - data directory and file names
//! - [`LoggingConfig`] - log level and optional log file
//! - [`SecurityConfig`] - Argon2 parameters and password policy
//!
//! ## Usage
//!
//! ```rust,no_run
//! use escapade::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("Base budget: {} ms", config.game.base_time_budget_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! base_time_budget_ms = 600000
//! default_difficulty = "NORMAL"
//! leaderboard_size = 10
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::game::types::{Difficulty, DEFAULT_TIME_BUDGET_MS};

fn default_base_time_budget_ms() -> u64 {
    DEFAULT_TIME_BUDGET_MS
}

fn default_leaderboard_size() -> usize {
    10
}

fn default_hint_point_cost() -> u64 {
    20
}

fn default_min_puzzle_points() -> u64 {
    10
}

fn default_users_file() -> String {
    "users.json".to_string()
}

fn default_dungeons_file() -> String {
    "dungeons.json".to_string()
}

fn default_leaderboard_file() -> String {
    "leaderboard.json".to_string()
}

fn default_progress_dir() -> String {
    "progress".to_string()
}

fn default_min_password_length() -> usize {
    8
}

/// Points awarded for solving a puzzle, by the puzzle's own difficulty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PuzzlePoints {
    pub easy: u64,
    pub normal: u64,
    pub hard: u64,
}

impl Default for PuzzlePoints {
    fn default() -> Self {
        Self {
            easy: 50,
            normal: 100,
            hard: 150,
        }
    }
}

impl PuzzlePoints {
    pub fn for_difficulty(&self, difficulty: Difficulty) -> u64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Time budget for dungeons whose content does not set one, before the
    /// difficulty multiplier.
    #[serde(default = "default_base_time_budget_ms")]
    pub base_time_budget_ms: u64,
    #[serde(default)]
    pub default_difficulty: Difficulty,
    /// Rows shown by leaderboard listings.
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
    /// Points deducted from a solve for each hint consumed on that puzzle.
    #[serde(default = "default_hint_point_cost")]
    pub hint_point_cost: u64,
    /// Floor for a single solve after hint deductions.
    #[serde(default = "default_min_puzzle_points")]
    pub min_puzzle_points: u64,
    #[serde(default)]
    pub puzzle_points: PuzzlePoints,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_time_budget_ms: default_base_time_budget_ms(),
            default_difficulty: Difficulty::default(),
            leaderboard_size: default_leaderboard_size(),
            hint_point_cost: default_hint_point_cost(),
            min_puzzle_points: default_min_puzzle_points(),
            puzzle_points: PuzzlePoints::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_dungeons_file")]
    pub dungeons_file: String,
    #[serde(default = "default_leaderboard_file")]
    pub leaderboard_file: String,
    /// Directory (under `data_dir`) holding one sub-directory of save slots per player.
    #[serde(default = "default_progress_dir")]
    pub progress_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            users_file: default_users_file(),
            dungeons_file: default_dungeons_file(),
            leaderboard_file: default_leaderboard_file(),
            progress_dir: default_progress_dir(),
        }
    }
}

impl StorageConfig {
    pub fn users_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.users_file)
    }

    pub fn dungeons_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.dungeons_file)
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.leaderboard_file)
    }

    pub fn progress_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.progress_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Argon2Config {
    #[serde(default)]
    pub memory_kib: Option<u32>,
    #[serde(default)]
    pub time_cost: Option<u32>,
    #[serde(default)]
    pub parallelism: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    #[serde(default)]
    pub argon2: Option<Argon2Config>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
            argon2: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values that would make the game unplayable
    pub fn validate(&self) -> Result<()> {
        if self.game.base_time_budget_ms == 0 {
            return Err(anyhow!("game.base_time_budget_ms must be greater than zero"));
        }
        if self.game.leaderboard_size == 0 {
            return Err(anyhow!("game.leaderboard_size must be greater than zero"));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        if self.security.min_password_length == 0 {
            return Err(anyhow!("security.min_password_length must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.game.base_time_budget_ms, 600_000);
        assert_eq!(config.game.leaderboard_size, 10);
        assert_eq!(config.game.default_difficulty, Difficulty::Normal);
        assert_eq!(config.security.min_password_length, 8);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [game]
            default_difficulty = "HARD"

            [storage]
            data_dir = "/tmp/escapade"
            "#,
        )
        .unwrap();
        assert_eq!(config.game.default_difficulty, Difficulty::Hard);
        assert_eq!(config.game.puzzle_points.for_difficulty(Difficulty::Hard), 150);
        assert_eq!(config.storage.users_file, "users.json");
        assert!(config.storage.users_path().ends_with("users.json"));
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let mut config = Config::default();
        config.game.base_time_budget_ms = 0;
        assert!(config.validate().is_err());
        config.game.base_time_budget_ms = 1;
        config.game.leaderboard_size = 0;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_create_default_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();
        let config = Config::load(path).await.unwrap();
        assert_eq!(config.storage.data_dir, "./data");
        assert!(config.logging.file.is_none());
    }
}
