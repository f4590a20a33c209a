//! Delayed effects
//!
//! A `Schedule` is a time-ordered queue of effect values. Entries due at the
//! same time pop in the order they were scheduled. Nothing is ever cancelled
//! here: each effect carries the token or id it needs to decide, when it
//! fires, whether it still applies.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry<T> {
    due_ms: f64,
    seq: u64,
    effect: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule<T> {
    /// Sorted by (due_ms, seq)
    entries: Vec<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for Schedule<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> Schedule<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `effect` to fire once the clock reaches `due_ms`
    pub fn schedule(&mut self, due_ms: f64, effect: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let idx = self
            .entries
            .partition_point(|e| e.due_ms < due_ms || (e.due_ms == due_ms && e.seq < seq));
        self.entries.insert(idx, Entry { due_ms, seq, effect });
    }

    /// Remove and return the earliest effect due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: f64) -> Option<T> {
        if self.entries.first().is_some_and(|e| e.due_ms <= now_ms) {
            Some(self.entries.remove(0).effect)
        } else {
            None
        }
    }

    /// Time of the next pending effect
    pub fn next_due(&self) -> Option<f64> {
        self.entries.first().map(|e| e.due_ms)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
