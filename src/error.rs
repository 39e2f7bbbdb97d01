use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage Error: {0}")]
    Storage(#[from] StorageError),

    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    InvalidSelector(String),
    #[error("Invalid value pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("Source '{name}' needs a '{key}' setting.")]
    IncompleteSource { name: String, key: &'static str },
    #[error("The base url configured for source '{name}' is invalid: {err}")]
    InvalidBaseUrl { name: String, err: url::ParseError },
    #[error("Source '{0}' is not configured.")]
    UnknownSource(String),

    #[error("No item with identity '{0}' in the worklist.")]
    UnknownItem(String),
    #[error("An item with identity '{0}' is already in the worklist.")]
    DuplicateItem(String),
    #[error("Seed line {0} isn't `identity<TAB>locator`.")]
    SeedLine(usize),

    #[error("Config Error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Failures of the persisted worklist. These abort a run.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("couldn't read store {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("store {path:?} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("store {path:?} lists identity '{identity}' more than once")]
    DuplicateIdentity { path: PathBuf, identity: String },
    #[error("couldn't serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("couldn't write store {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Classified per-item failure of the fetch-extract stage.
///
/// None of these are fatal: the outcome is recorded on the item and the run
/// moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The page doesn't exist (404/410, DNS or connection failure, bad locator).
    #[error("page not found: {0}")]
    NotFound(String),
    /// The page exists but the expected element isn't on it.
    #[error("expected element missing on {0}")]
    NoData(String),
    /// Anything worth retrying on a later run (5xx, 429, timeouts).
    #[error("transient failure: {0}")]
    Transient(String),
}
