use std::collections::HashSet;

use crate::models::{CatalogItem, WatchEntry};
use crate::normalize::normalized_title_key;

/// Lookup sets derived from the watched list.
///
/// Never patched in place: every change to the list goes through
/// [`WatchedIndex::rebuild`].
#[derive(Debug, Clone, Default)]
pub struct WatchedIndex {
    by_external_id: HashSet<String>,
    by_title_key: HashSet<String>,
    entry_count: usize,
}

impl WatchedIndex {
    pub fn rebuild(entries: &[WatchEntry]) -> Self {
        let mut index = Self {
            entry_count: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            if !entry.imdb_id.is_empty() {
                index.by_external_id.insert(entry.imdb_id.clone());
            }
            if !entry.title.is_empty() {
                index
                    .by_title_key
                    .insert(normalized_title_key(&entry.title, &entry.year));
            }
        }
        tracing::debug!(
            entries = entries.len(),
            ids = index.by_external_id.len(),
            titles = index.by_title_key.len(),
            "Rebuilt watched index"
        );
        index
    }

    /// Whether the index was built from an empty watched list.
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    pub fn len(&self) -> usize {
        self.entry_count
    }

    /// Raw set membership, ignoring the hide-watched toggle.
    pub fn contains(&self, imdb_id: Option<&str>, title: Option<&str>, year: &str) -> bool {
        if let Some(id) = imdb_id.filter(|id| !id.is_empty()) {
            if self.by_external_id.contains(id) {
                return true;
            }
        }
        match title.filter(|t| !t.is_empty()) {
            Some(title) => self
                .by_title_key
                .contains(&normalized_title_key(title, year)),
            None => false,
        }
    }

    /// Watched verdict for a catalog item. Always false while hide-watched is
    /// off or the watched list is empty.
    pub fn is_watched(&self, item: &CatalogItem, hide_watched: bool) -> bool {
        if !hide_watched || self.is_empty() {
            return false;
        }
        self.contains(item.imdb_id.as_deref(), Some(item.title.as_str()), &item.year)
    }
}
