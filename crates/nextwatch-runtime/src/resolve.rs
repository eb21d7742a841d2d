use nextwatch_api::{CatalogError, CatalogService};
use nextwatch_core::models::{CatalogItem, DetailRecord};

/// Enrich a picked item with its full record.
///
/// Tries the IMDb ID, then the TMDb ID. If both fail, or the item has
/// neither, the summary record is returned unchanged; enrichment never fails
/// the pick.
pub async fn resolve_detail<S>(catalog: &S, item: &CatalogItem) -> DetailRecord
where
    S: CatalogService<Error = CatalogError>,
{
    let kind = item.kind_or_movie();

    if let Some(imdb_id) = item.imdb_id.as_deref() {
        match catalog.detail_by_imdb(kind, imdb_id).await {
            Ok(detail) => return enriched(detail, item),
            Err(e) => {
                tracing::warn!(title = %item.title, imdb_id, error = %e, "IMDb detail lookup failed")
            }
        }
    }

    if let Some(tmdb_id) = item.tmdb_id {
        match catalog.detail_by_tmdb(kind, tmdb_id).await {
            Ok(detail) => return enriched(detail, item),
            Err(e) => {
                tracing::warn!(title = %item.title, tmdb_id, error = %e, "TMDb detail lookup failed")
            }
        }
    }

    tracing::debug!(title = %item.title, "Using list record without enrichment");
    DetailRecord {
        item: item.clone(),
        enriched: false,
    }
}

fn enriched(detail: CatalogItem, summary: &CatalogItem) -> DetailRecord {
    DetailRecord {
        item: detail.with_fallback(summary),
        enriched: true,
    }
}
