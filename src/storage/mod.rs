//! Filesystem data lake operations.
//!
//! Layout under the data directory:
//! - `raw/<match_id>.json`: provider payloads as fetched
//! - `normalized/matches.jsonl`: one normalized match bundle per line

pub mod jsonl;
pub mod store;

pub use jsonl::{JsonlReader, JsonlWriter};
pub use store::{MatchStore, Snapshot, StoredMatch};

use std::path::PathBuf;
use thiserror::Error;

use crate::models::MatchId;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Match {0} is already stored")]
    DuplicateMatch(MatchId),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn normalized_dir(&self) -> PathBuf {
        self.data_dir.join("normalized")
    }

    /// Append-only match log.
    pub fn matches_path(&self) -> PathBuf {
        self.normalized_dir().join("matches.jsonl")
    }

    /// Archived provider payload for one match.
    pub fn raw_match_path(&self, match_id: &MatchId) -> PathBuf {
        self.raw_dir().join(format!("{}.json", match_id))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
