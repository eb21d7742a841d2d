//! Trait definition for catalog services.
//!
//! The runtime talks to the catalog only through [`CatalogService`], so the
//! picker and detail resolver can run against a fake in tests.

use std::future::Future;

use nextwatch_core::models::{CatalogItem, Genre, MediaKind, MediaList};

/// A curated-list catalog (MDBList and compatible APIs).
pub trait CatalogService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Popular public lists.
    fn top_lists(&self) -> impl Future<Output = Result<Vec<MediaList>, Self::Error>> + Send;

    /// Lists owned by the API key's user.
    fn user_lists(&self) -> impl Future<Output = Result<Vec<MediaList>, Self::Error>> + Send;

    /// Items of one list, optionally narrowed by genre on the server side.
    fn list_items(
        &self,
        list_id: u64,
        genre: Option<&str>,
    ) -> impl Future<Output = Result<Vec<CatalogItem>, Self::Error>> + Send;

    /// Full record by IMDb ID.
    fn detail_by_imdb(
        &self,
        kind: MediaKind,
        imdb_id: &str,
    ) -> impl Future<Output = Result<CatalogItem, Self::Error>> + Send;

    /// Full record by TMDb ID.
    fn detail_by_tmdb(
        &self,
        kind: MediaKind,
        tmdb_id: u64,
    ) -> impl Future<Output = Result<CatalogItem, Self::Error>> + Send;

    /// Free-text search. `None` searches movies and shows.
    fn search(
        &self,
        kind: Option<MediaKind>,
        query: &str,
    ) -> impl Future<Output = Result<Vec<CatalogItem>, Self::Error>> + Send;

    /// Genre taxonomy.
    fn genres(&self) -> impl Future<Output = Result<Vec<Genre>, Self::Error>> + Send;

    /// Remaining request quota reported by the account endpoint.
    fn requests_remaining(&self) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send;

    /// Quota from the most recent response header, if the API sent one.
    fn last_rate_limit_remaining(&self) -> Option<u64>;
}
