use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DedupError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key field marker {field:?}")]
    InvalidKeyField {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to report progress")]
    Report(#[source] std::io::Error),
}

pub type DedupResult<T> = std::result::Result<T, DedupError>;
