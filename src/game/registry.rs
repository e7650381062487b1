//! Shared account and dungeon registries.
//!
//! Both registries are constructed once and handed to the facade and loaders
//! behind an `Arc`. Reads take a shared lock and may run together; inserts and
//! replacements take the exclusive lock. Lookups hand out clones so no caller
//! holds a lock across gameplay.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};

use crate::game::dungeon::Dungeon;
use crate::game::errors::GameError;
use crate::game::types::{Account, Difficulty};
use crate::logutil::escape_log;

/// Player-facing standing derived from the account score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerScore {
    pub username: String,
    pub score: u64,
    pub rank: u32,
}

#[derive(Debug, Default)]
pub struct AccountRepository {
    accounts: RwLock<Vec<Account>>,
}

impl AccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from loaded records. Later duplicates of a username are dropped.
    pub fn from_accounts(accounts: Vec<Account>) -> Self {
        let repo = Self::new();
        for account in accounts {
            let username = account.username.clone();
            if repo.register(account).is_err() {
                debug!("Skipping duplicate account {}", escape_log(&username));
            }
        }
        repo.recompute_ranks();
        repo
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Account>> {
        self.accounts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Account>> {
        self.accounts.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an account; usernames are unique case-insensitively.
    pub fn register(&self, account: Account) -> Result<(), GameError> {
        let mut accounts = self.write();
        if accounts.iter().any(|a| a.matches_username(&account.username)) {
            return Err(GameError::Validation(format!(
                "username '{}' is already taken",
                account.username
            )));
        }
        info!("Registered account {}", escape_log(&account.username));
        accounts.push(account);
        Ok(())
    }

    pub fn find(&self, username: &str) -> Option<Account> {
        self.read().iter().find(|a| a.matches_username(username)).cloned()
    }

    pub fn find_by_id(&self, id: &str) -> Option<Account> {
        self.read().iter().find(|a| a.id == id).cloned()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.read().iter().any(|a| a.matches_username(username))
    }

    /// Replace the stored account with the same id. Returns false if absent.
    pub fn update(&self, account: Account) -> bool {
        let mut accounts = self.write();
        match accounts.iter_mut().find(|a| a.id == account.id) {
            Some(slot) => {
                *slot = account;
                true
            }
            None => false,
        }
    }

    /// Mutate one account under the write lock.
    pub fn with_account_mut<R>(&self, username: &str, f: impl FnOnce(&mut Account) -> R) -> Option<R> {
        let mut accounts = self.write();
        accounts.iter_mut().find(|a| a.matches_username(username)).map(f)
    }

    pub fn snapshot(&self) -> Vec<Account> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Reassign 1-based ranks by score descending, ties by username.
    pub fn recompute_ranks(&self) {
        let mut accounts = self.write();
        let mut order: Vec<usize> = (0..accounts.len()).collect();
        order.sort_by(|&a, &b| {
            accounts[b]
                .score
                .cmp(&accounts[a].score)
                .then_with(|| accounts[a].username.to_lowercase().cmp(&accounts[b].username.to_lowercase()))
        });
        for (rank, index) in order.into_iter().enumerate() {
            accounts[index].rank = rank as u32 + 1;
        }
    }

    /// Top `n` accounts by current score.
    pub fn top_players(&self, n: usize) -> Vec<PlayerScore> {
        let mut players: Vec<PlayerScore> = self
            .read()
            .iter()
            .map(|a| PlayerScore {
                username: a.username.clone(),
                score: a.score,
                rank: a.rank,
            })
            .collect();
        players.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.username.to_lowercase().cmp(&b.username.to_lowercase()))
        });
        players.truncate(n);
        players
    }
}

/// Listing row for dungeon selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DungeonSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub room_count: usize,
    pub puzzle_count: usize,
}

impl From<&Dungeon> for DungeonSummary {
    fn from(dungeon: &Dungeon) -> Self {
        Self {
            id: dungeon.id.clone(),
            name: dungeon.name.clone(),
            description: dungeon.description.clone(),
            difficulty: dungeon.difficulty(),
            room_count: dungeon.rooms().len(),
            puzzle_count: dungeon.rooms().iter().map(|r| r.puzzles.len()).sum(),
        }
    }
}

/// Dungeon templates. Sessions play on clones, never on the stored graph.
#[derive(Debug, Default)]
pub struct DungeonRepository {
    dungeons: RwLock<Vec<Dungeon>>,
}

impl DungeonRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dungeons(dungeons: Vec<Dungeon>) -> Self {
        let repo = Self::new();
        for dungeon in dungeons {
            repo.insert(dungeon);
        }
        repo
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Dungeon>> {
        self.dungeons.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Dungeon>> {
        self.dungeons.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace by id. Returns true when an existing dungeon was replaced.
    pub fn insert(&self, dungeon: Dungeon) -> bool {
        let mut dungeons = self.write();
        match dungeons.iter_mut().find(|d| d.id == dungeon.id) {
            Some(slot) => {
                *slot = dungeon;
                true
            }
            None => {
                dungeons.push(dungeon);
                false
            }
        }
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut dungeons = self.write();
        let before = dungeons.len();
        dungeons.retain(|d| d.id != id);
        dungeons.len() != before
    }

    /// A fresh copy of the template with this id.
    pub fn get(&self, id: &str) -> Option<Dungeon> {
        self.read().iter().find(|d| d.id == id).cloned()
    }

    pub fn summaries(&self) -> Vec<DungeonSummary> {
        self.read().iter().map(DungeonSummary::from).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_are_unique_ignoring_case() {
        let repo = AccountRepository::new();
        assert!(repo.register(Account::new("Alice", "")).is_ok());
        assert!(repo.register(Account::new("alice", "")).is_err());
        assert_eq!(repo.len(), 1);
        assert!(repo.find("ALICE").is_some());
    }

    #[test]
    fn ranks_follow_score_then_name() {
        let repo = AccountRepository::new();
        for (name, score) in [("bob", 50), ("amy", 50), ("cyd", 90)] {
            let mut account = Account::new(name, "");
            account.score = score;
            repo.register(account).unwrap();
        }
        repo.recompute_ranks();
        assert_eq!(repo.find("cyd").unwrap().rank, 1);
        assert_eq!(repo.find("amy").unwrap().rank, 2);
        assert_eq!(repo.find("bob").unwrap().rank, 3);

        let top: Vec<String> = repo.top_players(2).into_iter().map(|p| p.username).collect();
        assert_eq!(top, vec!["cyd", "amy"]);
    }

    #[test]
    fn update_and_mutate_in_place() {
        let repo = AccountRepository::new();
        let account = Account::new("dan", "");
        repo.register(account.clone()).unwrap();
        assert_eq!(repo.with_account_mut("DAN", |a| a.ratchet_score(30)), Some(true));
        let mut stored = repo.find_by_id(&account.id).unwrap();
        assert_eq!(stored.score, 30);
        stored.score = 5;
        assert!(repo.update(stored));
        assert_eq!(repo.find("dan").unwrap().score, 5);
        assert!(!repo.update(Account::new("ghost", "")));
    }

    #[test]
    fn dungeon_insert_replaces_by_id() {
        let repo = DungeonRepository::new();
        assert!(!repo.insert(Dungeon::new("d1", "One", "")));
        assert!(repo.insert(Dungeon::new("d1", "Uno", "")));
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get("d1").unwrap().name, "Uno");
        assert!(repo.remove("d1"));
        assert!(repo.get("d1").is_none());
    }
}
