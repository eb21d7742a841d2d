mod db;
pub mod resolve;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;

use nextwatch_api::{CatalogError, CatalogService, MdbListClient};
use nextwatch_core::config::{AppConfig, ListSource};
use nextwatch_core::deeplink::StremioLinks;
use nextwatch_core::error::CoreError;
use nextwatch_core::filter::{self, FilterConfig};
use nextwatch_core::history::PickHistory;
use nextwatch_core::import;
use nextwatch_core::models::{
    CatalogItem, DetailRecord, Genre, HistoryEntry, MediaKind, MediaList, WatchEntry,
};
use nextwatch_core::picker;
use nextwatch_core::storage::keys;
use nextwatch_core::watched::WatchedIndex;

pub use db::DbHandle;
pub use resolve::resolve_detail;

/// Environment variable that overrides the stored API key for one session.
pub const API_KEY_ENV: &str = "NEXTWATCH_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("no list selected")]
    NoListSelected,
}

/// How an import combines with the stored watched list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// The imported files become the whole watched list.
    #[default]
    Replace,
    /// Imported titles are merged into the existing list.
    Append,
}

/// Result of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Titles in the watched list after the import.
    pub total: usize,
    /// Titles read from the files, after de-duplication.
    pub imported: usize,
}

/// Everything the front end shows after start-up.
#[derive(Debug, Clone)]
pub struct StartupInfo {
    pub lists: Result<Vec<MediaList>, String>,
    pub genres: Vec<Genre>,
    pub quota: Option<u64>,
}

/// Watched list, its derived index, and the pick history.
struct AppState {
    watched: Vec<WatchEntry>,
    index: Arc<WatchedIndex>,
    hide_watched: bool,
    history: PickHistory,
    default_list: ListSource,
    list_cache: HashMap<(u64, Option<String>), Vec<CatalogItem>>,
}

/// Long-lived application state. Owns the catalog client, the settings
/// store and the in-memory watched index.
pub struct Runtime<S = MdbListClient> {
    db: DbHandle,
    config: AppConfig,
    catalog: S,
    state: RwLock<AppState>,
}

impl Runtime<MdbListClient> {
    /// Load config, open the database, and build the MDBList client from the
    /// stored (or environment) API key.
    pub async fn open() -> Result<Self, RuntimeError> {
        let config = AppConfig::load().map_err(|e| RuntimeError::Config(e.to_string()))?;
        let db_path =
            AppConfig::ensure_db_path().map_err(|e| RuntimeError::Config(e.to_string()))?;
        let db = DbHandle::open(&db_path)
            .ok_or_else(|| RuntimeError::Database("failed to open database".into()))?;

        let api_key = match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => db
                .get_or(keys::API_KEY, String::new())
                .await
                .map_err(|e| RuntimeError::Database(e.to_string()))?,
        };
        let catalog = catalog_client(&config, api_key)?;

        Self::with_catalog(config, db, catalog).await
    }
}

/// Build an MDBList client using the configured base URL and timeout.
pub fn catalog_client(config: &AppConfig, api_key: String) -> Result<MdbListClient, RuntimeError> {
    Ok(MdbListClient::with_config(
        api_key,
        config.api.base_url.clone(),
        Duration::from_secs(config.api.timeout_secs),
    )?)
}

impl<S> Runtime<S>
where
    S: CatalogService<Error = CatalogError>,
{
    /// Assemble a runtime from parts, loading persisted state from `db`.
    pub async fn with_catalog(config: AppConfig, db: DbHandle, catalog: S) -> Result<Self, RuntimeError> {
        let watched: Vec<WatchEntry> = db
            .get_or(keys::WATCHED, Vec::new())
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))?;
        let history: PickHistory = db
            .get_or(keys::HISTORY, PickHistory::new(Vec::new()))
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))?;
        let hide_watched = db
            .get_or(keys::HIDE_WATCHED, config.picker.hide_watched)
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))?;
        let default_list = db
            .get_or(keys::DEFAULT_LIST, config.picker.default_list)
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))?;

        let index = Arc::new(WatchedIndex::rebuild(&watched));
        tracing::info!(
            watched = watched.len(),
            history = history.len(),
            hide_watched,
            %default_list,
            "Loaded saved state"
        );

        Ok(Self {
            db,
            config,
            catalog,
            state: RwLock::new(AppState {
                watched,
                index,
                hide_watched,
                history,
                default_list,
                list_cache: HashMap::new(),
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &S {
        &self.catalog
    }

    // ── Catalog ─────────────────────────────────────────────────

    /// Lists from the given source, or the saved default source.
    pub async fn load_lists(&self, source: Option<ListSource>) -> Result<Vec<MediaList>, RuntimeError> {
        let source = match source {
            Some(s) => s,
            None => self.state.read().await.default_list,
        };
        let lists = match source {
            ListSource::Top => self.catalog.top_lists().await?,
            ListSource::My => self.catalog.user_lists().await?,
        };
        tracing::info!(count = lists.len(), %source, "Lists loaded");
        Ok(lists)
    }

    /// Genre taxonomy, or the built-in list when the API is unavailable.
    pub async fn load_genres(&self) -> Vec<Genre> {
        match self.catalog.genres().await {
            Ok(genres) if !genres.is_empty() => genres,
            Ok(_) => Genre::fallback_list(),
            Err(e) => {
                tracing::warn!(error = %e, "Genre lookup failed, using built-in genres");
                Genre::fallback_list()
            }
        }
    }

    /// Load genres and lists together, then the account quota.
    pub async fn startup(&self) -> StartupInfo {
        let (genres, lists) = futures::join!(self.load_genres(), self.load_lists(None));
        let quota = match self.catalog.requests_remaining().await {
            Ok(q) => q,
            Err(e) => {
                tracing::debug!(error = %e, "Quota lookup failed");
                None
            }
        };
        StartupInfo {
            lists: lists.map_err(|e| e.to_string()),
            genres,
            quota: quota.or_else(|| self.catalog.last_rate_limit_remaining()),
        }
    }

    /// Remaining request quota, as last reported by the API.
    pub fn quota(&self) -> Option<u64> {
        self.catalog.last_rate_limit_remaining()
    }

    /// Filtered candidates for one list. Raw items are cached per
    /// (list, genre); `refresh` forces a refetch.
    pub async fn candidates(
        &self,
        list_id: u64,
        filters: &FilterConfig,
        refresh: bool,
    ) -> Result<Vec<CatalogItem>, RuntimeError> {
        let cache_key = (list_id, filters.genre.clone().filter(|g| !g.is_empty()));

        let cached = if refresh {
            None
        } else {
            self.state.read().await.list_cache.get(&cache_key).cloned()
        };
        let raw = match cached {
            Some(items) => items,
            None => {
                let items = self
                    .catalog
                    .list_items(list_id, cache_key.1.as_deref())
                    .await?;
                self.state
                    .write()
                    .await
                    .list_cache
                    .insert(cache_key, items.clone());
                items
            }
        };

        let index = Arc::clone(&self.state.read().await.index);
        Ok(filter::filter(raw, filters, &index))
    }

    /// Pick a random candidate from a list, resolve its details and record
    /// it in the history. Without a list ID the first list of the default
    /// source is used.
    pub async fn pick_random(
        &self,
        list_id: Option<u64>,
        filters: &FilterConfig,
        refresh: bool,
    ) -> Result<DetailRecord, RuntimeError> {
        let list_id = match list_id {
            Some(id) => id,
            None => {
                let first = self.load_lists(None).await?.into_iter().next();
                let list = first.ok_or(RuntimeError::NoListSelected)?;
                tracing::info!(list = %list, "Using first list");
                list.id
            }
        };
        let candidates = self.candidates(list_id, filters, refresh).await?;
        let pick = picker::pick(&candidates)?.clone();
        tracing::info!(title = %pick.title, candidates = candidates.len(), "Picked");
        self.show_result(&pick).await
    }

    /// Resolve an item (picked or chosen from search) and add it to history.
    pub async fn show_result(&self, item: &CatalogItem) -> Result<DetailRecord, RuntimeError> {
        let detail = resolve_detail(&self.catalog, item).await;
        self.record_history(&detail.item).await?;
        Ok(detail)
    }

    pub async fn search(
        &self,
        query: &str,
        kind: Option<MediaKind>,
    ) -> Result<Vec<CatalogItem>, RuntimeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let results = self.catalog.search(kind, query).await?;
        tracing::info!(query, count = results.len(), "Search finished");
        Ok(results)
    }

    // ── Filters & links ─────────────────────────────────────────

    /// Filter defaults from config and saved settings. Callers override
    /// fields from user input.
    pub async fn default_filters(&self) -> FilterConfig {
        FilterConfig {
            genre: None,
            media_type: self.config.picker.media_type,
            min_score: self.config.picker.min_score,
            hide_watched: self.state.read().await.hide_watched,
        }
    }

    pub fn links_for(&self, item: &CatalogItem) -> Option<StremioLinks> {
        let imdb_id = item.imdb_id.as_deref()?;
        StremioLinks::from_config(imdb_id, item.kind_or_movie(), &self.config.links)
    }

    pub fn links_for_history(&self, entry: &HistoryEntry) -> Option<StremioLinks> {
        StremioLinks::from_config(&entry.imdb_id, entry.media_type, &self.config.links)
    }

    // ── Watched list ────────────────────────────────────────────

    /// Import watch-history CSV files.
    ///
    /// Nothing is stored when no file had a recognizable header or when no
    /// usable titles were found.
    pub async fn import_watched(
        &self,
        paths: &[PathBuf],
        mode: ImportMode,
    ) -> Result<ImportOutcome, RuntimeError> {
        let mut texts = Vec::with_capacity(paths.len());
        for path in paths {
            texts.push(read_text(path).await?);
        }

        let batch = import::import_files(&texts);
        let imported = import::merge(batch.entries);
        if !batch.header_recognized {
            return Err(CoreError::UnrecognizedImportFormat.into());
        }
        if imported.is_empty() {
            return Err(CoreError::EmptyImport.into());
        }

        let count = imported.len();
        let entries = match mode {
            ImportMode::Replace => imported,
            ImportMode::Append => {
                let existing = self.state.read().await.watched.clone();
                import::merge(existing.into_iter().chain(imported))
            }
        };
        let total = entries.len();
        self.replace_watched(entries).await?;
        tracing::info!(files = paths.len(), imported = count, total, ?mode, "Imported watched titles");

        Ok(ImportOutcome {
            total,
            imported: count,
        })
    }

    pub async fn clear_watched(&self) -> Result<(), RuntimeError> {
        self.replace_watched(Vec::new()).await?;
        tracing::info!("Watched list cleared");
        Ok(())
    }

    /// Store a new watched list, then swap in a freshly built index.
    async fn replace_watched(&self, entries: Vec<WatchEntry>) -> Result<(), RuntimeError> {
        self.db
            .set(keys::WATCHED, &entries)
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))?;

        let index = Arc::new(WatchedIndex::rebuild(&entries));
        let mut state = self.state.write().await;
        state.watched = entries;
        state.index = index;
        state.list_cache.clear();
        Ok(())
    }

    pub async fn watched_count(&self) -> usize {
        self.state.read().await.watched.len()
    }

    pub async fn watched_status(&self) -> String {
        match self.watched_count().await {
            0 => "No data imported".to_string(),
            n => format!("Imported {n} watched titles"),
        }
    }

    pub async fn hide_watched(&self) -> bool {
        self.state.read().await.hide_watched
    }

    pub async fn set_hide_watched(&self, hide: bool) -> Result<(), RuntimeError> {
        self.db
            .set(keys::HIDE_WATCHED, &hide)
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))?;
        let mut state = self.state.write().await;
        state.hide_watched = hide;
        state.list_cache.clear();
        Ok(())
    }

    // ── History ─────────────────────────────────────────────────

    /// The updated history is stored first and only then swapped in.
    async fn record_history(&self, item: &CatalogItem) -> Result<(), RuntimeError> {
        let entry = HistoryEntry::from_item(item, Utc::now());
        let mut state = self.state.write().await;
        let mut history = state.history.clone();
        history.record(entry, self.config.history.limit);
        self.db
            .set(keys::HISTORY, &history)
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))?;
        state.history = history;
        Ok(())
    }

    /// Most recent picks, up to the configured display count.
    pub async fn recent_history(&self) -> Vec<HistoryEntry> {
        self.state
            .read()
            .await
            .history
            .recent(self.config.history.display)
            .to_vec()
    }

    pub async fn clear_history(&self) -> Result<(), RuntimeError> {
        let mut state = self.state.write().await;
        self.db
            .remove(keys::HISTORY)
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))?;
        state.history.clear();
        Ok(())
    }

    // ── Settings ────────────────────────────────────────────────

    pub async fn default_list(&self) -> ListSource {
        self.state.read().await.default_list
    }

    /// The API key saved in settings, if any. The environment override is not
    /// consulted.
    pub async fn stored_api_key(&self) -> Result<Option<String>, RuntimeError> {
        let key: String = self
            .db
            .get_or(keys::API_KEY, String::new())
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))?;
        Ok(Some(key).filter(|k| !k.is_empty()))
    }

    /// Save settings. A new API key takes effect on the next [`Runtime::open`].
    pub async fn save_settings(
        &self,
        api_key: Option<&str>,
        default_list: Option<ListSource>,
    ) -> Result<(), RuntimeError> {
        if let Some(key) = api_key {
            self.db
                .set(keys::API_KEY, key.trim())
                .await
                .map_err(|e| RuntimeError::Database(e.to_string()))?;
        }
        if let Some(source) = default_list {
            self.db
                .set(keys::DEFAULT_LIST, &source)
                .await
                .map_err(|e| RuntimeError::Database(e.to_string()))?;
        }

        let mut state = self.state.write().await;
        if let Some(source) = default_list {
            state.default_list = source;
        }
        state.list_cache.clear();
        tracing::info!(api_key_changed = api_key.is_some(), "Settings saved");
        Ok(())
    }
}

async fn read_text(path: &Path) -> Result<String, CoreError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CoreError::FileReadFailure {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests;
