use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

use tempfile::NamedTempFile;

use super::*;

/// In-memory catalog that counts calls and can be told to fail lookups.
#[derive(Default)]
struct FakeCatalog {
    lists: Vec<MediaList>,
    items: HashMap<u64, Vec<CatalogItem>>,
    imdb_details: HashMap<String, CatalogItem>,
    tmdb_details: HashMap<u64, CatalogItem>,
    genres: Option<Vec<Genre>>,
    item_calls: Mutex<usize>,
    search_calls: Mutex<usize>,
}

fn not_found() -> CatalogError {
    CatalogError::Upstream {
        status: 404,
        message: "not found".into(),
    }
}

impl CatalogService for FakeCatalog {
    type Error = CatalogError;

    async fn top_lists(&self) -> Result<Vec<MediaList>, CatalogError> {
        Ok(self.lists.clone())
    }

    async fn user_lists(&self) -> Result<Vec<MediaList>, CatalogError> {
        Err(CatalogError::MissingApiKey)
    }

    async fn list_items(
        &self,
        list_id: u64,
        _genre: Option<&str>,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        *self.item_calls.lock().unwrap() += 1;
        self.items.get(&list_id).cloned().ok_or_else(not_found)
    }

    async fn detail_by_imdb(
        &self,
        _kind: MediaKind,
        imdb_id: &str,
    ) -> Result<CatalogItem, CatalogError> {
        self.imdb_details.get(imdb_id).cloned().ok_or_else(not_found)
    }

    async fn detail_by_tmdb(
        &self,
        _kind: MediaKind,
        tmdb_id: u64,
    ) -> Result<CatalogItem, CatalogError> {
        self.tmdb_details.get(&tmdb_id).cloned().ok_or_else(not_found)
    }

    async fn search(
        &self,
        _kind: Option<MediaKind>,
        query: &str,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        *self.search_calls.lock().unwrap() += 1;
        Ok(vec![item(query, "2020", "tt9999999", 70.0)])
    }

    async fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        self.genres.clone().ok_or(CatalogError::RateLimited)
    }

    async fn requests_remaining(&self) -> Result<Option<u64>, CatalogError> {
        Ok(Some(500))
    }

    fn last_rate_limit_remaining(&self) -> Option<u64> {
        None
    }
}

fn item(title: &str, year: &str, imdb_id: &str, score: f64) -> CatalogItem {
    CatalogItem {
        imdb_id: Some(imdb_id.to_string()),
        title: title.to_string(),
        year: year.to_string(),
        media_type: Some(MediaKind::Movie),
        raw_media_type: "movie".into(),
        score: Some(score),
        ..Default::default()
    }
}

fn sample_catalog() -> FakeCatalog {
    let mut catalog = FakeCatalog {
        lists: vec![MediaList {
            id: 1,
            name: "Top Movies".into(),
            items: Some(2),
        }],
        ..Default::default()
    };
    catalog.items.insert(
        1,
        vec![
            item("Alien", "1979", "tt0078748", 84.0),
            item("Heat", "1995", "tt0113277", 83.0),
        ],
    );
    catalog
}

async fn runtime(catalog: FakeCatalog) -> Runtime<FakeCatalog> {
    let db = DbHandle::open_memory().unwrap();
    Runtime::with_catalog(AppConfig::default(), db, catalog)
        .await
        .unwrap()
}

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn pick_defaults_to_the_first_list() {
    let mut catalog = sample_catalog();
    catalog.lists.push(MediaList {
        id: 2,
        name: "Empty".into(),
        items: Some(0),
    });
    catalog.items.insert(2, Vec::new());
    let rt = runtime(catalog).await;

    let filters = rt.default_filters().await;
    let detail = rt.pick_random(None, &filters, false).await.unwrap();
    assert!(["Alien", "Heat"].contains(&detail.item.title.as_str()));
}

#[tokio::test]
async fn pick_without_any_list_is_no_list_selected() {
    let rt = runtime(FakeCatalog::default()).await;
    let filters = rt.default_filters().await;
    let err = rt.pick_random(None, &filters, false).await.unwrap_err();
    assert!(matches!(err, RuntimeError::NoListSelected));
    assert_eq!(*rt.catalog().item_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn pick_skips_watched_and_records_history() {
    let mut catalog = sample_catalog();
    catalog.imdb_details.insert(
        "tt0113277".into(),
        CatalogItem {
            description: Some("A group of bank robbers.".into()),
            runtime: Some(170),
            ..Default::default()
        },
    );
    let rt = runtime(catalog).await;

    let file = csv_file("Name,Year\nAlien,1979\n");
    rt.import_watched(&[file.path().to_path_buf()], ImportMode::Replace)
        .await
        .unwrap();

    let filters = rt.default_filters().await;
    assert!(filters.hide_watched);
    let detail = rt.pick_random(Some(1), &filters, false).await.unwrap();
    assert!(detail.enriched);
    assert_eq!(detail.item.title, "Heat");
    assert_eq!(detail.item.year, "1995");
    assert_eq!(detail.item.runtime, Some(170));

    let history = rt.recent_history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].imdb_id, "tt0113277");
}

#[tokio::test]
async fn everything_filtered_out_is_an_empty_candidate_set() {
    let rt = runtime(sample_catalog()).await;
    let filters = FilterConfig {
        min_score: 90,
        ..rt.default_filters().await
    };
    let err = rt.pick_random(Some(1), &filters, false).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Core(CoreError::EmptyCandidateSet)));
    assert!(rt.recent_history().await.is_empty());
}

#[tokio::test]
async fn raw_items_are_cached_until_invalidated() {
    let rt = runtime(sample_catalog()).await;
    let filters = rt.default_filters().await;

    rt.candidates(1, &filters, false).await.unwrap();
    rt.candidates(1, &filters, false).await.unwrap();
    assert_eq!(*rt.catalog().item_calls.lock().unwrap(), 1);

    rt.candidates(1, &filters, true).await.unwrap();
    assert_eq!(*rt.catalog().item_calls.lock().unwrap(), 2);

    rt.set_hide_watched(false).await.unwrap();
    rt.candidates(1, &filters, false).await.unwrap();
    assert_eq!(*rt.catalog().item_calls.lock().unwrap(), 3);
}

#[tokio::test]
async fn cached_items_are_refiltered_after_import() {
    let rt = runtime(sample_catalog()).await;
    let filters = rt.default_filters().await;
    assert_eq!(rt.candidates(1, &filters, false).await.unwrap().len(), 2);

    let file = csv_file("imdbID\ntt0078748\n");
    rt.import_watched(&[file.path().to_path_buf()], ImportMode::Replace)
        .await
        .unwrap();

    let left = rt.candidates(1, &filters, false).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].title, "Heat");
}

#[tokio::test]
async fn unrecognized_import_keeps_existing_list() {
    let rt = runtime(sample_catalog()).await;
    let good = csv_file("Title,Year\nAlien,1979\nHeat,1995\n");
    rt.import_watched(&[good.path().to_path_buf()], ImportMode::Replace)
        .await
        .unwrap();

    let bad = csv_file("foo,bar\n1,2\n");
    let err = rt
        .import_watched(&[bad.path().to_path_buf()], ImportMode::Replace)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Core(CoreError::UnrecognizedImportFormat)
    ));

    let empty = csv_file("Title,Year\n,\n");
    let err = rt
        .import_watched(&[empty.path().to_path_buf()], ImportMode::Replace)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Core(CoreError::EmptyImport)));

    assert_eq!(rt.watched_count().await, 2);
}

#[tokio::test]
async fn append_merges_and_replace_overwrites() {
    let rt = runtime(sample_catalog()).await;
    let first = csv_file("Title,Year\nAlien,1979\n");
    let second = csv_file("Title,Year,imdbID\nHeat,1995,tt0113277\nAlien,1979,\n");

    rt.import_watched(&[first.path().to_path_buf()], ImportMode::Replace)
        .await
        .unwrap();
    let outcome = rt
        .import_watched(&[second.path().to_path_buf()], ImportMode::Append)
        .await
        .unwrap();
    assert_eq!(outcome.imported, 2);
    assert_eq!(outcome.total, 2);
    assert_eq!(rt.watched_status().await, "Imported 2 watched titles");

    let outcome = rt
        .import_watched(&[first.path().to_path_buf()], ImportMode::Replace)
        .await
        .unwrap();
    assert_eq!(outcome.total, 1);
    assert_eq!(rt.watched_status().await, "Imported 1 watched titles");

    rt.clear_watched().await.unwrap();
    assert_eq!(rt.watched_status().await, "No data imported");
}

#[tokio::test]
async fn unreadable_file_is_reported_with_its_path() {
    let rt = runtime(sample_catalog()).await;
    let missing = PathBuf::from("/nonexistent/watched.csv");
    let err = rt
        .import_watched(&[missing.clone()], ImportMode::Replace)
        .await
        .unwrap_err();
    match err {
        RuntimeError::Core(CoreError::FileReadFailure { path, .. }) => assert_eq!(path, missing),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn detail_falls_back_from_imdb_to_tmdb_to_summary() {
    let mut catalog = sample_catalog();
    catalog.tmdb_details.insert(
        348,
        CatalogItem {
            title: "Alien".into(),
            description: Some("In space no one can hear you scream.".into()),
            ..Default::default()
        },
    );
    let rt = runtime(catalog).await;

    let mut alien = item("Alien", "1979", "tt0078748", 84.0);
    alien.tmdb_id = Some(348);
    let detail = rt.show_result(&alien).await.unwrap();
    assert!(detail.enriched);
    assert_eq!(detail.item.imdb_id.as_deref(), Some("tt0078748"));
    assert!(detail.item.description.is_some());

    let heat = item("Heat", "1995", "tt0113277", 83.0);
    let detail = rt.show_result(&heat).await.unwrap();
    assert!(!detail.enriched);
    assert_eq!(detail.item, heat);

    let history = rt.recent_history().await;
    assert_eq!(history[0].title, "Heat");
    assert_eq!(history[1].title, "Alien");
}

#[tokio::test]
async fn genres_fall_back_when_lookup_fails() {
    let rt = runtime(sample_catalog()).await;
    assert_eq!(rt.load_genres().await, Genre::fallback_list());
}

#[tokio::test]
async fn startup_reports_each_part() {
    let mut catalog = sample_catalog();
    catalog.genres = Some(vec![Genre {
        id: "horror".into(),
        name: "Horror".into(),
    }]);
    let rt = runtime(catalog).await;

    let info = rt.startup().await;
    assert_eq!(info.lists.unwrap().len(), 1);
    assert_eq!(info.genres.len(), 1);
    assert_eq!(info.quota, Some(500));

    rt.save_settings(None, Some(ListSource::My)).await.unwrap();
    assert!(rt.startup().await.lists.is_err());
}

#[tokio::test]
async fn blank_search_does_not_call_the_catalog() {
    let rt = runtime(sample_catalog()).await;
    assert!(rt.search("   ", None).await.unwrap().is_empty());
    assert_eq!(*rt.catalog().search_calls.lock().unwrap(), 0);

    let results = rt.search(" dune ", None).await.unwrap();
    assert_eq!(results[0].title, "dune");
}

#[tokio::test]
async fn state_survives_a_restart() {
    let db = DbHandle::open_memory().unwrap();
    let rt = Runtime::with_catalog(AppConfig::default(), db.clone(), sample_catalog())
        .await
        .unwrap();

    let file = csv_file("Title,Year\nAlien,1979\n");
    rt.import_watched(&[file.path().to_path_buf()], ImportMode::Replace)
        .await
        .unwrap();
    rt.set_hide_watched(false).await.unwrap();
    rt.show_result(&item("Heat", "1995", "tt0113277", 83.0))
        .await
        .unwrap();
    rt.save_settings(Some("  secret "), Some(ListSource::My))
        .await
        .unwrap();
    drop(rt);

    let rt = Runtime::with_catalog(AppConfig::default(), db.clone(), sample_catalog())
        .await
        .unwrap();
    assert_eq!(rt.watched_count().await, 1);
    assert!(!rt.hide_watched().await);
    assert_eq!(rt.recent_history().await.len(), 1);
    assert_eq!(rt.default_list().await, ListSource::My);
    assert_eq!(db.get_or(keys::API_KEY, String::new()).await.unwrap(), "secret");

    rt.clear_history().await.unwrap();
    assert!(rt.recent_history().await.is_empty());
    drop(rt);

    let rt = Runtime::with_catalog(AppConfig::default(), db, sample_catalog())
        .await
        .unwrap();
    assert!(rt.recent_history().await.is_empty());
}

#[tokio::test]
async fn failed_history_write_leaves_history_unchanged() {
    let mut rt = runtime(sample_catalog()).await;
    rt.show_result(&item("Alien", "1979", "tt0078748", 84.0))
        .await
        .unwrap();

    rt.db = DbHandle::closed();
    let err = rt
        .show_result(&item("Heat", "1995", "tt0113277", 83.0))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Database(_)));

    let history = rt.recent_history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].title, "Alien");

    assert!(rt.clear_history().await.is_err());
    assert_eq!(rt.recent_history().await.len(), 1);
}

#[tokio::test]
async fn links_use_configured_bases() {
    let rt = runtime(sample_catalog()).await;
    let links = rt.links_for(&item("Heat", "1995", "tt0113277", 83.0)).unwrap();
    assert_eq!(links.web, "https://web.stremio.com/#/detail/movie/tt0113277");
    assert_eq!(links.app, "stremio:///detail/movie/tt0113277/tt0113277");

    let no_id = CatalogItem {
        title: "Mystery".into(),
        ..Default::default()
    };
    assert!(rt.links_for(&no_id).is_none());
}
