use crate::config::LinksConfig;
use crate::models::MediaKind;

pub const DEFAULT_WEB_BASE: &str = "https://web.stremio.com/#/detail";
pub const DEFAULT_APP_SCHEME: &str = "stremio:///detail";

/// Player links for a resolved title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StremioLinks {
    /// Works in any browser.
    pub web: String,
    /// Native app deep link.
    pub app: String,
}

impl StremioLinks {
    /// Build links with the stock Stremio endpoints. `None` without an IMDb ID.
    pub fn new(imdb_id: &str, kind: MediaKind) -> Option<Self> {
        Self::with_bases(imdb_id, kind, DEFAULT_WEB_BASE, DEFAULT_APP_SCHEME)
    }

    pub fn from_config(imdb_id: &str, kind: MediaKind, links: &LinksConfig) -> Option<Self> {
        Self::with_bases(imdb_id, kind, &links.web_base, &links.app_scheme)
    }

    fn with_bases(imdb_id: &str, kind: MediaKind, web_base: &str, app_scheme: &str) -> Option<Self> {
        let imdb_id = imdb_id.trim();
        if imdb_id.is_empty() {
            return None;
        }
        let ty = kind.as_stremio_str();
        // Movies carry the ID again as the stream/video segment.
        let video = match kind {
            MediaKind::Movie => imdb_id,
            MediaKind::Show => "",
        };
        Some(Self {
            web: format!("{}/{ty}/{imdb_id}", web_base.trim_end_matches('/')),
            app: format!("{}/{ty}/{imdb_id}/{video}", app_scheme.trim_end_matches('/')),
        })
    }
}
