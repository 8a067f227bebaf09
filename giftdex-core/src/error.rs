//! Error types for loading the catalog documents

use thiserror::Error;

/// Error raised while fetching or parsing one of the source documents.
///
/// None of these are fatal to the caller: the loaders in [`crate::source`]
/// log them and fall back to an empty dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch {url}: {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid source location: {0}")]
    InvalidLocation(String),
}

pub type Result<T> = std::result::Result<T, LoadError>;
