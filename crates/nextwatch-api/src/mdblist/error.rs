use thiserror::Error;

/// Errors from the MDBList API client.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limit hit, try again later")]
    RateLimited,

    #[error("API error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no API key set")]
    MissingApiKey,
}
