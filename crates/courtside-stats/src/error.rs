// Error type for the stats source.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("stats request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("stats API returned HTTP {status}")]
    Status { status: u16 },

    #[error("unexpected stats response shape: {0}")]
    Shape(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("failed to serialize raw response: {0}")]
    Json(#[from] serde_json::Error),
}
