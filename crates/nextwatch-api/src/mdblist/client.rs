use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use nextwatch_core::models::{CatalogItem, Genre, MediaKind, MediaList};

use super::error::CatalogError;
use super::types::{
    decode_array, list_items_from_value, search_results_from_value, MdbGenre, MdbItem, MdbList,
    MdbUser,
};
use crate::traits::CatalogService;

/// Header carrying the remaining request quota.
const RATE_LIMIT_HEADER: &str = "X-RateLimit-Remaining";

/// Sentinel for "no quota header seen yet".
const QUOTA_UNKNOWN: u64 = u64::MAX;

/// Items fetched per list request.
const LIST_PAGE_LIMIT: &str = "100";

/// Results fetched per search.
const SEARCH_LIMIT: &str = "10";

/// MDBList REST client. The API key travels as the `apikey` query parameter.
pub struct MdbListClient {
    api_key: String,
    base_url: String,
    http: Client,
    remaining: AtomicU64,
}

impl MdbListClient {
    /// Client against the given base URL with a request timeout.
    pub fn with_config(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            remaining: AtomicU64::new(QUOTA_UNKNOWN),
        })
    }

    /// Map throttling and non-2xx statuses to errors, and note the quota header.
    async fn check_response(&self, resp: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
        let status = resp.status();
        if status.as_u16() == 429 {
            tracing::warn!("MDBList rate limit hit");
            return Err(CatalogError::RateLimited);
        }
        if !status.is_success() {
            let status = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "MDBList API error");
            return Err(CatalogError::Upstream {
                status,
                message: body,
            });
        }

        if let Some(remaining) = resp
            .headers()
            .get(RATE_LIMIT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.remaining.store(remaining, Ordering::Relaxed);
        }
        Ok(resp)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, CatalogError> {
        if self.api_key.is_empty() {
            return Err(CatalogError::MissingApiKey);
        }
        tracing::debug!(path, "MDBList request");

        let resp = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let resp = self.check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    async fn lists(&self, path: &str) -> Result<Vec<MediaList>, CatalogError> {
        let value = self.get_json(path, &[]).await?;
        Ok(decode_array::<MdbList>(value)
            .into_iter()
            .filter_map(MdbList::into_media_list)
            .collect())
    }

    /// Detail lookup; a record without a type inherits the requested bucket.
    async fn detail(&self, path: &str, kind: MediaKind) -> Result<CatalogItem, CatalogError> {
        let value = self
            .get_json(path, &[("append_to_response", "genre")])
            .await?;
        let raw: MdbItem =
            serde_json::from_value(value).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let mut item = raw.into_catalog_item();
        if item.raw_media_type.is_empty() {
            item.raw_media_type = kind.as_api_str().to_string();
            item.media_type = Some(kind);
        }
        Ok(item)
    }
}

impl CatalogService for MdbListClient {
    type Error = CatalogError;

    async fn top_lists(&self) -> Result<Vec<MediaList>, CatalogError> {
        self.lists("/lists/top").await
    }

    async fn user_lists(&self) -> Result<Vec<MediaList>, CatalogError> {
        self.lists("/lists/user").await
    }

    async fn list_items(
        &self,
        list_id: u64,
        genre: Option<&str>,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        let path = format!("/lists/{list_id}/items");
        let mut query = vec![("limit", LIST_PAGE_LIMIT), ("append_to_response", "genre")];
        if let Some(genre) = genre.filter(|g| !g.is_empty()) {
            query.push(("filter_genre", genre));
        }

        let value = self.get_json(&path, &query).await?;
        let items: Vec<CatalogItem> = list_items_from_value(value)
            .into_iter()
            .map(MdbItem::into_catalog_item)
            .collect();
        tracing::debug!(list_id, count = items.len(), "Fetched list items");
        Ok(items)
    }

    async fn detail_by_imdb(
        &self,
        kind: MediaKind,
        imdb_id: &str,
    ) -> Result<CatalogItem, CatalogError> {
        let path = format!("/imdb/{}/{imdb_id}", kind.as_api_str());
        self.detail(&path, kind).await
    }

    async fn detail_by_tmdb(
        &self,
        kind: MediaKind,
        tmdb_id: u64,
    ) -> Result<CatalogItem, CatalogError> {
        let path = format!("/tmdb/{}/{tmdb_id}", kind.as_api_str());
        self.detail(&path, kind).await
    }

    async fn search(
        &self,
        kind: Option<MediaKind>,
        query: &str,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        let ty = kind.map(|k| k.as_api_str()).unwrap_or("any");
        let path = format!("/search/{ty}");
        let value = self
            .get_json(&path, &[("query", query), ("limit", SEARCH_LIMIT)])
            .await?;
        Ok(search_results_from_value(value)
            .into_iter()
            .map(MdbItem::into_catalog_item)
            .collect())
    }

    async fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let value = self.get_json("/genres", &[]).await?;
        Ok(decode_array::<MdbGenre>(value)
            .into_iter()
            .map(MdbGenre::into_genre)
            .collect())
    }

    async fn requests_remaining(&self) -> Result<Option<u64>, CatalogError> {
        let value = self.get_json("/user", &[]).await?;
        let user: MdbUser =
            serde_json::from_value(value).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Ok(user.requests_remaining.as_ref().and_then(|s| s.as_u64()))
    }

    fn last_rate_limit_remaining(&self) -> Option<u64> {
        match self.remaining.load(Ordering::Relaxed) {
            QUOTA_UNKNOWN => None,
            n => Some(n),
        }
    }
}
