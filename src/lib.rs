//! Polite, resumable enrichment of a film worklist from Wikipedia, IMDB and
//! IMSDb pages.
//!
//! A run loads a [`store::WorklistStore`], fetches every pending item one at a
//! time through [`parse::fetch_and_extract`], folds the outcome in with
//! [`merge::merge`] and saves as it goes.

mod macros;
pub mod error;
pub mod item;
pub mod locator;
pub mod merge;
pub mod parse;
pub mod process;
pub mod request;
pub mod rule;
pub mod settings;
pub mod source;
pub mod store;
pub mod table;

pub use error::{Error, FetchError, Result, StorageError};

/// Pause between two items unless configured otherwise.
const DEFAULT_DELAY_MS: u64 = 500;
const DEFAULT_BATCH_SIZE: usize = 1;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Looked up without extension, so `reelscrap.toml`, `.yaml` or `.json`.
const DEFAULT_CONFIG_FILE: &str = "reelscrap";
const USER_AGENT: &str = concat!("reelscrap/", env!("CARGO_PKG_VERSION"));
