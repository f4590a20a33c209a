//! Hi-score and ranking
//!
//! Persisted through a `KeyValueStore`, tracks the top 5 runs.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, PersistenceError, load_json, save_json};

/// Maximum number of ranked runs to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// A single ranked run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Unix timestamp (ms) when the run ended
    pub timestamp_ms: u64,
}

/// Hi-score plus the ranking, sorted descending by score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HighScores {
    pub hi_score: u64,
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "rush_breaker_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the ranking
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished run. Raises the hi-score when beaten and returns
    /// the rank achieved, if any.
    pub fn add_score(&mut self, score: u64, timestamp_ms: u64) -> Option<usize> {
        self.record_hi_score(score);
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            timestamp_ms,
        };
        // Ties rank below the earlier run
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Raise the hi-score if `score` beats it
    pub fn record_hi_score(&mut self, score: u64) -> bool {
        if score <= self.hi_score {
            return false;
        }
        self.hi_score = score;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn try_load(store: &dyn KeyValueStore) -> Result<Self, PersistenceError> {
        Ok(load_json(store, Self::STORAGE_KEY)?.unwrap_or_default())
    }

    /// Load, falling back to an empty table when storage is missing or broken
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match Self::try_load(store) {
            Ok(scores) => {
                log::info!(
                    "Loaded hi-score {} with {} ranked runs",
                    scores.hi_score,
                    scores.entries.len()
                );
                scores
            }
            Err(e) => {
                log::warn!("High scores unavailable, starting fresh: {e}");
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistenceError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Format a timestamp relative to `now_ms`
pub fn format_age(timestamp_ms: u64, now_ms: u64) -> String {
    let diff_mins = now_ms.saturating_sub(timestamp_ms) / 60_000;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    match (diff_days, diff_hours, diff_mins) {
        (1, _, _) => "Yesterday".to_string(),
        (d, _, _) if d > 1 => format!("{d} days ago"),
        (_, 1, _) => "1 hour ago".to_string(),
        (_, h, _) if h > 1 => format!("{h} hours ago"),
        (_, _, 1) => "1 min ago".to_string(),
        (_, _, m) if m > 1 => format!("{m} mins ago"),
        _ => "Just now".to_string(),
    }
}
