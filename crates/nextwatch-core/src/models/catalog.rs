use serde::{Deserialize, Serialize};

/// Movie/show bucket used for filtering, detail lookups and deep links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Show,
}

/// Upstream type strings and the bucket each one folds into.
const MEDIA_TYPE_SYNONYMS: &[(&str, MediaKind)] = &[
    ("movie", MediaKind::Movie),
    ("show", MediaKind::Show),
    ("series", MediaKind::Show),
    ("tv", MediaKind::Show),
];

impl MediaKind {
    /// Map an upstream media-type string onto a bucket (case-insensitive).
    pub fn from_upstream(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        MEDIA_TYPE_SYNONYMS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|&(_, kind)| kind)
    }

    /// Path segment for the catalog API's detail endpoints.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Show => "show",
        }
    }

    /// Type segment used by Stremio links.
    pub fn as_stremio_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Show => "series",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "Movie"),
            Self::Show => write!(f, "Show"),
        }
    }
}

/// A single per-source rating shown on the result card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub source: String,
    pub value: f64,
}

/// Canonical catalog record. Upstream shapes are mapped into this once, at
/// the API boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<u64>,
    pub title: String,
    pub year: String,
    pub media_type: Option<MediaKind>,
    /// The type string as the API sent it, for display.
    pub raw_media_type: String,
    /// 0-100 scale.
    pub score: Option<f64>,
    pub genres: Vec<String>,
    pub poster: Option<String>,
    pub description: Option<String>,
    /// Minutes.
    pub runtime: Option<u32>,
    pub ratings: Vec<Rating>,
}

impl CatalogItem {
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    /// Bucket for API lookups and links; unknown types count as movies.
    pub fn kind_or_movie(&self) -> MediaKind {
        self.media_type.unwrap_or(MediaKind::Movie)
    }

    /// Fill fields the detail record left empty from the summary record.
    pub fn with_fallback(mut self, summary: &CatalogItem) -> CatalogItem {
        if self.title.is_empty() {
            self.title = summary.title.clone();
        }
        if self.year.is_empty() {
            self.year = summary.year.clone();
        }
        if self.media_type.is_none() {
            self.media_type = summary.media_type;
        }
        if self.raw_media_type.is_empty() {
            self.raw_media_type = summary.raw_media_type.clone();
        }
        if self.imdb_id.is_none() {
            self.imdb_id = summary.imdb_id.clone();
        }
        if self.tmdb_id.is_none() {
            self.tmdb_id = summary.tmdb_id;
        }
        if self.score.is_none() {
            self.score = summary.score;
        }
        if self.runtime.is_none() {
            self.runtime = summary.runtime;
        }
        if self.description.is_none() {
            self.description = summary.description.clone();
        }
        if self.poster.is_none() {
            self.poster = summary.poster.clone();
        }
        self
    }
}

/// Result of detail resolution. `enriched` is false when the summary record
/// was used as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    pub item: CatalogItem,
    pub enriched: bool,
}

/// A curated list from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaList {
    pub id: u64,
    pub name: String,
    pub items: Option<u32>,
}

impl std::fmt::Display for MediaList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.items {
            Some(n) => write!(f, "{} ({n} items)", self.name),
            None => write!(f, "{} (? items)", self.name),
        }
    }
}

/// A genre from the catalog taxonomy. `id` is the value sent back as the
/// genre filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

/// Used when the catalog's genre endpoint is unavailable.
pub const FALLBACK_GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "History",
    "Horror",
    "Music",
    "Mystery",
    "Romance",
    "Science Fiction",
    "Thriller",
    "War",
    "Western",
];

impl Genre {
    pub fn fallback_list() -> Vec<Genre> {
        FALLBACK_GENRES
            .iter()
            .map(|&g| Genre {
                id: g.to_string(),
                name: g.to_string(),
            })
            .collect()
    }
}
