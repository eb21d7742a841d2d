use serde::{Deserialize, Serialize};

use crate::models::{CatalogItem, MediaKind};
use crate::watched::WatchedIndex;

/// Active filters for one pick. Genre is not applied here: it is passed to the
/// catalog API as a query parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub genre: Option<String>,
    pub media_type: Option<MediaKind>,
    pub min_score: u32,
    pub hide_watched: bool,
}

/// Narrow raw list items down to the candidate set.
///
/// Stages run in a fixed order: media type, minimum score, watched. An empty
/// result is a valid "no candidates" outcome.
pub fn filter(
    mut items: Vec<CatalogItem>,
    config: &FilterConfig,
    watched: &WatchedIndex,
) -> Vec<CatalogItem> {
    let total = items.len();

    if let Some(kind) = config.media_type {
        items.retain(|item| item.media_type == Some(kind));
    }
    let after_type = items.len();

    if config.min_score > 0 {
        let threshold = f64::from(config.min_score);
        items.retain(|item| item.score_or_zero() >= threshold);
    }
    let after_score = items.len();

    if config.hide_watched && !watched.is_empty() {
        items.retain(|item| !watched.is_watched(item, true));
    }

    tracing::debug!(
        total,
        after_type,
        after_score,
        candidates = items.len(),
        "Filtered list items"
    );
    items
}
