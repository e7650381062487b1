//! Competitive score table: one entry per username, ranked by score
//! (descending), then elapsed time (ascending), then submission time
//! (ascending). A later submission only replaces an entry it strictly outranks.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::logutil::escape_log;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u64,
    pub elapsed_ms: u64,
    pub submitted_at: DateTime<Utc>,
    /// Submission counter; breaks ties between identical timestamps.
    #[serde(default)]
    pub sequence: u64,
}

impl LeaderboardEntry {
    /// Ranking order: `Less` means `self` ranks ahead of `other`.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then(self.elapsed_ms.cmp(&other.elapsed_ms))
            .then(self.submitted_at.cmp(&other.submitted_at))
            .then(self.sequence.cmp(&other.sequence))
    }

    pub fn outranks(&self, other: &Self) -> bool {
        self.rank_cmp(other) == Ordering::Less
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// First entry for this username.
    Inserted,
    /// The candidate outranked the stored entry and replaced it.
    Replaced,
    /// The stored entry ranks at least as well; nothing changed.
    Kept,
}

impl SubmitOutcome {
    pub fn changed(self) -> bool {
        self != SubmitOutcome::Kept
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    #[serde(default)]
    next_sequence: u64,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a result stamped with the current time. Negative inputs count as zero.
    pub fn submit(&mut self, username: &str, score: i64, elapsed_ms: i64) -> SubmitOutcome {
        self.submit_at(username, score, elapsed_ms, Utc::now())
    }

    /// Submit with an explicit timestamp.
    pub fn submit_at(
        &mut self,
        username: &str,
        score: i64,
        elapsed_ms: i64,
        submitted_at: DateTime<Utc>,
    ) -> SubmitOutcome {
        let candidate = LeaderboardEntry {
            username: username.trim().to_string(),
            score: score.max(0) as u64,
            elapsed_ms: elapsed_ms.max(0) as u64,
            submitted_at,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        let outcome = match self.position(&candidate.username) {
            None => {
                self.entries.push(candidate);
                SubmitOutcome::Inserted
            }
            Some(index) if candidate.outranks(&self.entries[index]) => {
                self.entries[index] = candidate;
                SubmitOutcome::Replaced
            }
            Some(_) => SubmitOutcome::Kept,
        };
        debug!(
            "Leaderboard submit {} score={} elapsed={}ms: {:?}",
            escape_log(username),
            score,
            elapsed_ms,
            outcome
        );
        outcome
    }

    /// The best `n` entries in rank order.
    pub fn top_score(&self, n: usize) -> Vec<LeaderboardEntry> {
        if n == 0 {
            return Vec::new();
        }
        let mut ranked: Vec<&LeaderboardEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| a.rank_cmp(b));
        ranked.into_iter().take(n).cloned().collect()
    }

    pub fn entry(&self, username: &str) -> Option<&LeaderboardEntry> {
        self.position(username).map(|i| &self.entries[i])
    }

    /// 1-based rank of `username`.
    pub fn rank_of(&self, username: &str) -> Option<usize> {
        let entry = self.entry(username)?;
        Some(self.entries.iter().filter(|e| e.outranks(entry)).count() + 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, username: &str) -> Option<usize> {
        let username = username.trim();
        self.entries
            .iter()
            .position(|e| e.username.eq_ignore_ascii_case(username))
    }
}
