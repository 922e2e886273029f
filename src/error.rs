use std::path::PathBuf;

/// Failure while mining a single snapshot. Logged and skipped by the parser.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in embedded script: {0}")]
    Json(#[from] serde_json::Error),
}
