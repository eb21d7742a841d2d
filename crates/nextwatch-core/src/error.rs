use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no items match your filters")]
    EmptyCandidateSet,

    #[error("CSV header not recognized; expected Name/Title + Year or IMDb ID")]
    UnrecognizedImportFormat,

    #[error("no watched titles found in that CSV")]
    EmptyImport,

    #[error("could not read {}: {source}", path.display())]
    FileReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
