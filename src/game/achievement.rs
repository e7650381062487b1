//! Achievement records and award bookkeeping.
//!
//! An achievement is tied to one puzzle inside one dungeon. The facade asks the
//! puzzle whether the condition holds right after it is solved; this module only
//! owns the one-way unlock and the account bookkeeping.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::types::Account;

/// Optional thresholds a puzzle variant may consult when evaluating an achievement.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AchievementCriteria {
    /// Solve must happen within this much session time.
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
    /// Session score must be at least this high.
    #[serde(default)]
    pub min_score: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub dungeon_id: String,
    pub puzzle_id: String,
    pub points: u32,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub criteria: AchievementCriteria,
}

impl Achievement {
    pub fn new(id: &str, name: &str, description: &str, dungeon_id: &str, puzzle_id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            dungeon_id: dungeon_id.to_string(),
            puzzle_id: puzzle_id.to_string(),
            points: 0,
            unlocked: false,
            unlocked_at: None,
            criteria: AchievementCriteria::default(),
        }
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.criteria.time_limit_ms = Some(ms);
        self
    }

    pub fn with_min_score(mut self, score: u64) -> Self {
        self.criteria.min_score = Some(score);
        self
    }

    /// Unlock the achievement. Returns false if it already was.
    pub fn unlock(&mut self) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        self.unlocked_at = Some(Utc::now());
        true
    }

    pub fn relates_to(&self, dungeon_id: &str, puzzle_id: &str) -> bool {
        self.dungeon_id == dungeon_id && self.puzzle_id == puzzle_id
    }

    pub fn within_time_limit(&self, elapsed_ms: u64) -> bool {
        self.criteria.time_limit_ms.map_or(true, |limit| elapsed_ms <= limit)
    }

    pub fn meets_min_score(&self, score: u64) -> bool {
        self.criteria.min_score.map_or(true, |min| score >= min)
    }
}

/// Achievements for `(dungeon, puzzle)` the account has not earned yet.
pub fn pending_achievements<'a>(
    catalog: &'a [Achievement],
    account: &Account,
    dungeon_id: &str,
    puzzle_id: &str,
) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|a| a.relates_to(dungeon_id, puzzle_id))
        .filter(|a| !account.has_achievement(&a.id))
        .collect()
}

/// Record an unlocked copy of `achievement` on the account and add its points.
///
/// Returns the points awarded, or `None` when the account already holds it.
pub fn award_achievement(account: &mut Account, achievement: &Achievement) -> Option<u32> {
    if account.has_achievement(&achievement.id) {
        return None;
    }
    let mut earned = achievement.clone();
    earned.unlock();
    account.score += u64::from(earned.points);
    let points = earned.points;
    account.achievements.push(earned);
    Some(points)
}

/// Achievements the account has unlocked, oldest first.
pub fn earned_achievements(account: &Account) -> Vec<&Achievement> {
    let mut earned: Vec<&Achievement> = account.achievements.iter().filter(|a| a.unlocked).collect();
    earned.sort_by_key(|a| a.unlocked_at);
    earned
}
