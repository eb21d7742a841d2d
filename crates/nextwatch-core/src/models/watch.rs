use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{CatalogItem, MediaKind};

/// One previously-watched title from an imported export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub imdb_id: String,
}

impl WatchEntry {
    pub fn new(title: impl Into<String>, year: impl Into<String>, imdb_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: year.into(),
            imdb_id: imdb_id.into(),
        }
    }

    pub fn by_id(imdb_id: impl Into<String>) -> Self {
        Self::new("", "", imdb_id)
    }

    pub fn by_title(title: impl Into<String>, year: impl Into<String>) -> Self {
        Self::new(title, year, "")
    }

    /// An entry is usable only if it carries a title or an external ID.
    pub fn is_identifiable(&self) -> bool {
        !self.title.is_empty() || !self.imdb_id.is_empty()
    }
}

/// A previously picked title, most recent first in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    pub year: String,
    pub imdb_id: String,
    pub media_type: MediaKind,
    #[serde(default)]
    pub poster: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_item(item: &CatalogItem, timestamp: DateTime<Utc>) -> Self {
        Self {
            title: if item.title.is_empty() {
                "Unknown".to_string()
            } else {
                item.title.clone()
            },
            year: item.year.clone(),
            imdb_id: item.imdb_id.clone().unwrap_or_default(),
            media_type: item.kind_or_movie(),
            poster: item.poster.clone(),
            timestamp,
        }
    }
}
