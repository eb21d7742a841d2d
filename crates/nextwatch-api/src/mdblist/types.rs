use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use nextwatch_core::models::{CatalogItem, Genre, MediaKind, MediaList, Rating};

// ── Loosely-typed scalars ───────────────────────────────────────

/// A field MDBList sends as either a number or a string, depending on the
/// endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Num(serde_json::Number),
    Str(String),
    Other(Value),
}

impl Scalar {
    pub fn as_text(&self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Str(s) => s.trim().to_string(),
            Self::Other(_) => String::new(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(n) => n.as_f64(),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Other(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Num(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Other(_) => None,
        }
    }
}

/// Genres arrive as a list of names, a list of `{name}` objects, or a
/// comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GenreField {
    List(Vec<GenreValue>),
    Csv(String),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GenreValue {
    Name(String),
    Object { name: Option<String> },
    Other(Value),
}

impl GenreField {
    pub fn names(&self) -> Vec<String> {
        let raw: Vec<String> = match self {
            Self::List(values) => values
                .iter()
                .filter_map(|v| match v {
                    GenreValue::Name(n) => Some(n.clone()),
                    GenreValue::Object { name } => name.clone(),
                    GenreValue::Other(_) => None,
                })
                .collect(),
            Self::Csv(s) => s.split(',').map(str::to_string).collect(),
            Self::Other(_) => Vec::new(),
        };
        raw.into_iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect()
    }
}

// ── Items (list entries, search hits, detail records) ──────────

/// Rating fields shown on the result card, in display order.
const RATING_FIELDS: &[&str] = &[
    "imdbrating",
    "tmdbrating",
    "traktrating",
    "letterboxdrating",
    "rottenrating",
    "metacriticrating",
];

fn rating_label(field: &str) -> &'static str {
    match field {
        "imdbrating" => "IMDb",
        "tmdbrating" => "TMDb",
        "traktrating" => "Trakt",
        "letterboxdrating" => "Letterboxd",
        "rottenrating" => "RT",
        "metacriticrating" => "Metacritic",
        _ => "",
    }
}

/// One title as any MDBList endpoint returns it. Field names differ between
/// endpoints, so every known alias is captured separately and resolved in
/// [`MdbItem::into_catalog_item`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MdbItem {
    pub imdb_id: Option<String>,
    pub imdbid: Option<String>,
    pub tmdb_id: Option<Scalar>,
    pub tmdbid: Option<Scalar>,
    /// List items carry the TMDb ID here.
    pub id: Option<Scalar>,
    /// Detail records nest their IDs.
    pub ids: Option<MdbIds>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub year: Option<Scalar>,
    pub release_year: Option<Scalar>,
    pub mediatype: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub score: Option<Scalar>,
    pub genre: Option<GenreField>,
    pub genres: Option<GenreField>,
    pub poster: Option<String>,
    pub description: Option<String>,
    pub overview: Option<String>,
    pub runtime: Option<Scalar>,
    pub imdbrating: Option<Scalar>,
    pub tmdbrating: Option<Scalar>,
    pub traktrating: Option<Scalar>,
    pub letterboxdrating: Option<Scalar>,
    pub rottenrating: Option<Scalar>,
    pub metacriticrating: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MdbIds {
    pub imdb: Option<String>,
    pub imdbid: Option<String>,
    pub tmdb: Option<Scalar>,
    pub tmdbid: Option<Scalar>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl MdbItem {
    fn rating(&self, field: &str) -> Option<&Scalar> {
        match field {
            "imdbrating" => self.imdbrating.as_ref(),
            "tmdbrating" => self.tmdbrating.as_ref(),
            "traktrating" => self.traktrating.as_ref(),
            "letterboxdrating" => self.letterboxdrating.as_ref(),
            "rottenrating" => self.rottenrating.as_ref(),
            "metacriticrating" => self.metacriticrating.as_ref(),
            _ => None,
        }
    }

    fn ratings(&self) -> Vec<Rating> {
        RATING_FIELDS
            .iter()
            .filter_map(|&field| {
                let value = self.rating(field)?.as_f64()?;
                (value != 0.0).then(|| Rating {
                    source: rating_label(field).to_string(),
                    value,
                })
            })
            .collect()
    }

    pub fn into_catalog_item(self) -> CatalogItem {
        let ratings = self.ratings();
        let raw_media_type = non_empty(self.mediatype.clone())
            .or_else(|| non_empty(self.kind.clone()))
            .unwrap_or_default();
        let genres = self
            .genre
            .as_ref()
            .or(self.genres.as_ref())
            .map(GenreField::names)
            .unwrap_or_default();

        let ids = self.ids.unwrap_or_default();
        let tmdb_id = [
            self.tmdb_id.as_ref(),
            self.tmdbid.as_ref(),
            self.id.as_ref(),
            ids.tmdb.as_ref(),
            ids.tmdbid.as_ref(),
        ]
        .into_iter()
        .flatten()
        .filter_map(Scalar::as_u64)
        .find(|&id| id != 0);

        CatalogItem {
            imdb_id: non_empty(self.imdb_id)
                .or_else(|| non_empty(self.imdbid))
                .or_else(|| non_empty(ids.imdb))
                .or_else(|| non_empty(ids.imdbid)),
            tmdb_id,
            title: non_empty(self.title)
                .or_else(|| non_empty(self.name))
                .unwrap_or_default(),
            year: self
                .year
                .as_ref()
                .or(self.release_year.as_ref())
                .map(Scalar::as_text)
                .unwrap_or_default(),
            media_type: MediaKind::from_upstream(&raw_media_type),
            raw_media_type,
            score: self.score.as_ref().and_then(Scalar::as_f64),
            genres,
            poster: non_empty(self.poster),
            description: non_empty(self.description).or_else(|| non_empty(self.overview)),
            runtime: self
                .runtime
                .as_ref()
                .and_then(Scalar::as_u64)
                .filter(|&m| m > 0)
                .map(|m| m as u32),
            ratings,
        }
    }
}

// ── Lists, genres, account ─────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct MdbList {
    pub id: Scalar,
    pub name: String,
    pub items: Option<Scalar>,
}

impl MdbList {
    pub fn into_media_list(self) -> Option<MediaList> {
        Some(MediaList {
            id: self.id.as_u64()?,
            name: self.name,
            items: self.items.as_ref().and_then(Scalar::as_u64).map(|n| n as u32),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MdbGenre {
    pub id: Option<Scalar>,
    pub name: String,
}

impl MdbGenre {
    pub fn into_genre(self) -> Genre {
        let id = self
            .id
            .as_ref()
            .map(Scalar::as_text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.name.clone());
        Genre { id, name: self.name }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MdbUser {
    pub requests_remaining: Option<Scalar>,
}

// ── Response envelopes ─────────────────────────────────────────

/// Decode every element of a JSON array that fits `T`; anything else is
/// skipped. A non-array yields nothing.
pub fn decode_array<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// List items come back as a bare array, or an object holding `movies` and
/// `shows` (or a generic `items`).
pub fn list_items_from_value(value: Value) -> Vec<MdbItem> {
    match value {
        Value::Array(_) => decode_array(value),
        Value::Object(mut map) => {
            let mut items: Vec<MdbItem> = Vec::new();
            for key in ["movies", "shows"] {
                if let Some(v) = map.remove(key) {
                    items.extend(decode_array::<MdbItem>(v));
                }
            }
            if items.is_empty() {
                if let Some(v) = map.remove("items") {
                    items = decode_array(v);
                }
            }
            items
        }
        _ => Vec::new(),
    }
}

/// Search results come back as a bare array or under `search`.
pub fn search_results_from_value(value: Value) -> Vec<MdbItem> {
    match value {
        Value::Object(mut map) => map.remove("search").map(decode_array).unwrap_or_default(),
        other => decode_array(other),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn list_item_shape() {
        let item: MdbItem = serde_json::from_value(json!({
            "id": 603,
            "rank": 1,
            "adult": 0,
            "title": "The Matrix",
            "imdb_id": "tt0133093",
            "tvdb_id": null,
            "mediatype": "movie",
            "release_year": 1999,
            "score": 87,
            "genre": ["action", "science fiction"]
        }))
        .unwrap();
        let item = item.into_catalog_item();
        assert_eq!(item.title, "The Matrix");
        assert_eq!(item.year, "1999");
        assert_eq!(item.media_type, Some(MediaKind::Movie));
        assert_eq!(item.score, Some(87.0));
        assert_eq!(item.imdb_id.as_deref(), Some("tt0133093"));
        assert_eq!(item.tmdb_id, Some(603));
        assert_eq!(item.genres, vec!["action", "science fiction"]);
    }

    #[test]
    fn nested_ids_fill_missing_top_level_ids() {
        let item: MdbItem = serde_json::from_value(json!({
            "title": "Breaking Bad",
            "type": "show",
            "ids": { "imdb": "tt0903747", "tmdb": 1396, "trakt": 1388 }
        }))
        .unwrap();
        let item = item.into_catalog_item();
        assert_eq!(item.imdb_id.as_deref(), Some("tt0903747"));
        assert_eq!(item.tmdb_id, Some(1396));
    }

    #[test]
    fn top_level_ids_win_over_nested() {
        let item: MdbItem = serde_json::from_value(json!({
            "imdb_id": "tt0133093",
            "tmdb_id": 603,
            "ids": { "imdb": "tt9999999", "tmdb": 1 }
        }))
        .unwrap();
        let item = item.into_catalog_item();
        assert_eq!(item.imdb_id.as_deref(), Some("tt0133093"));
        assert_eq!(item.tmdb_id, Some(603));
    }

    #[test]
    fn detail_shape_with_aliases() {
        let item: MdbItem = serde_json::from_value(json!({
            "title": "Breaking Bad",
            "year": "2008",
            "type": "series",
            "imdbid": "tt0903747",
            "tmdbid": "1396",
            "overview": "A chemistry teacher turns to crime.",
            "runtime": 47,
            "genres": [{"id": 18, "name": "Drama"}, {"name": " Crime "}],
            "imdbrating": 9.5,
            "tmdbrating": 0,
            "rottenrating": "96"
        }))
        .unwrap();
        let item = item.into_catalog_item();
        assert_eq!(item.media_type, Some(MediaKind::Show));
        assert_eq!(item.raw_media_type, "series");
        assert_eq!(item.imdb_id.as_deref(), Some("tt0903747"));
        assert_eq!(item.tmdb_id, Some(1396));
        assert_eq!(item.runtime, Some(47));
        assert_eq!(item.description.as_deref(), Some("A chemistry teacher turns to crime."));
        assert_eq!(item.genres, vec!["Drama", "Crime"]);
        let sources: Vec<&str> = item.ratings.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["IMDb", "RT"]);
    }

    #[test]
    fn csv_genre_string_and_missing_fields() {
        let item: MdbItem =
            serde_json::from_value(json!({ "name": "Untitled", "genre": "drama, war" })).unwrap();
        let item = item.into_catalog_item();
        assert_eq!(item.title, "Untitled");
        assert_eq!(item.genres, vec!["drama", "war"]);
        assert!(item.score.is_none());
        assert!(item.media_type.is_none());
        assert!(item.imdb_id.is_none());
    }

    #[test]
    fn list_items_envelopes() {
        let bare = list_items_from_value(json!([{ "title": "A" }, { "title": "B" }]));
        assert_eq!(bare.len(), 2);

        let split = list_items_from_value(json!({
            "movies": [{ "title": "A", "mediatype": "movie" }],
            "shows": [{ "title": "B", "mediatype": "show" }]
        }));
        assert_eq!(split.len(), 2);

        let generic = list_items_from_value(json!({ "items": [{ "title": "C" }] }));
        assert_eq!(generic.len(), 1);

        assert!(list_items_from_value(json!({ "error": "nope" })).is_empty());
        assert!(list_items_from_value(json!("nope")).is_empty());
    }

    #[test]
    fn search_envelopes() {
        let wrapped = search_results_from_value(json!({ "search": [{ "title": "Dune" }] }));
        assert_eq!(wrapped.len(), 1);
        let bare = search_results_from_value(json!([{ "title": "Dune" }]));
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn list_and_genre_conversion() {
        let lists: Vec<MdbList> = decode_array(json!([
            { "id": 2194, "name": "Latest Movies", "items": 200 },
            { "id": "bad", "name": "Broken" }
        ]));
        let lists: Vec<MediaList> = lists.into_iter().filter_map(MdbList::into_media_list).collect();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].to_string(), "Latest Movies (200 items)");

        let genre: MdbGenre = serde_json::from_value(json!({ "name": "Horror" })).unwrap();
        assert_eq!(genre.into_genre().id, "Horror");
        let genre: MdbGenre =
            serde_json::from_value(json!({ "id": "sci-fi", "name": "Science Fiction" })).unwrap();
        assert_eq!(genre.into_genre().id, "sci-fi");
    }
}
