use serde::{Deserialize, Serialize};

use crate::models::HistoryEntry;

/// Default number of picks remembered.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Bounded most-recent-first pick history, unique by IMDb ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickHistory {
    entries: Vec<HistoryEntry>,
}

impl Default for PickHistory {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PickHistory {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    /// Put `entry` at the front, dropping any earlier pick with the same ID,
    /// then trim to `limit`.
    pub fn record(&mut self, entry: HistoryEntry, limit: usize) {
        self.entries.retain(|h| h.imdb_id != entry.imdb_id);
        self.entries.insert(0, entry);
        self.entries.truncate(limit);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The `n` most recent picks.
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
