//! Ingestion pipeline.
//!
//! Match reference → duplicate check → provider fetch → raw archive →
//! normalize → atomic write. The raw payload is archived as soon as it is
//! fetched; nothing reaches the match store unless every step succeeds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{MatchBundle, MatchId};
use crate::normalize::{normalize_match, parse_raw_match, SchemaError};
use crate::provider::{MatchProvider, ProviderError};
use crate::storage::{MatchStore, StorageError};
use crate::{extract_match_id, is_valid_match_id};

/// Errors that can occur while ingesting a match.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid match reference: {0}")]
    InvalidMatchReference(String),

    #[error("Match {0} already exists")]
    Duplicate(MatchId),

    #[error("Failed to fetch match data: {0}")]
    Provider(#[from] ProviderError),

    #[error("Match payload rejected: {0}")]
    Schema(#[from] SchemaError),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for IngestError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::DuplicateMatch(id) => IngestError::Duplicate(id),
            other => IngestError::Storage(other),
        }
    }
}

/// Where an ingestion failure came from, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Bad reference or payload
    Validation,
    /// Match already stored
    Duplicate,
    /// Provider failure
    Upstream,
    /// Anything else
    Internal,
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::InvalidMatchReference(_) | IngestError::Schema(_) => ErrorKind::Validation,
            IngestError::Duplicate(_) => ErrorKind::Duplicate,
            IngestError::Provider(_) => ErrorKind::Upstream,
            IngestError::Storage(_) => ErrorKind::Internal,
        }
    }
}

/// Summary of a stored match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub match_id: MatchId,
    pub map: String,
    pub started_at: DateTime<Utc>,
    pub players: usize,
}

impl IngestOutcome {
    fn from_bundle(bundle: &MatchBundle) -> Self {
        Self {
            match_id: bundle.game.id.clone(),
            map: bundle.game.map.clone(),
            started_at: bundle.game.started_at,
            players: bundle.entries.len(),
        }
    }
}

/// Runs the pipeline against a store and a provider.
#[derive(Clone)]
pub struct Ingestor {
    store: Arc<MatchStore>,
    provider: Arc<dyn MatchProvider>,
}

impl Ingestor {
    pub fn new(store: Arc<MatchStore>, provider: Arc<dyn MatchProvider>) -> Self {
        Self { store, provider }
    }

    /// Ingest the match a URL or bare id refers to.
    pub async fn ingest_reference(&self, reference: &str) -> Result<IngestOutcome, IngestError> {
        let match_id = extract_match_id(reference)
            .filter(|id| is_valid_match_id(id.as_str()))
            .ok_or_else(|| IngestError::InvalidMatchReference(reference.trim().to_string()))?;

        if self.store.contains_match(&match_id) {
            info!(%match_id, "Match already stored, skipping fetch");
            return Err(IngestError::Duplicate(match_id));
        }

        info!(%match_id, provider = self.provider.name(), "Ingesting match");
        let fetched = self.provider.fetch_match(&match_id).await?;

        if let Err(e) = self.store.archive_raw(&match_id, &fetched.body) {
            warn!(%match_id, "Failed to archive raw payload: {}", e);
        }

        let bundle = parse_raw_match(&fetched.body)
            .and_then(|raw| normalize_match(&raw))
            .inspect_err(|e| {
                warn!(%match_id, "Rejected match payload: {}", e);
            })?;
        if bundle.game.id != match_id {
            warn!(
                requested = %match_id,
                received = %bundle.game.id,
                "Provider returned a different match id"
            );
        }

        self.store_bundle(bundle)
    }

    /// Ingest a payload already in hand (bare match or provider envelope).
    pub fn ingest_payload(&self, json: &str) -> Result<IngestOutcome, IngestError> {
        let raw = parse_raw_match(json)?;
        let bundle = normalize_match(&raw)?;

        if self.store.contains_match(&bundle.game.id) {
            return Err(IngestError::Duplicate(bundle.game.id));
        }
        if let Err(e) = self.store.archive_raw(&bundle.game.id, json) {
            warn!(match_id = %bundle.game.id, "Failed to archive raw payload: {}", e);
        }

        self.store_bundle(bundle)
    }

    fn store_bundle(&self, bundle: MatchBundle) -> Result<IngestOutcome, IngestError> {
        let outcome = IngestOutcome::from_bundle(&bundle);
        self.store.insert(bundle)?;
        info!(
            match_id = %outcome.match_id,
            map = %outcome.map,
            players = outcome.players,
            "Match ingested"
        );
        Ok(outcome)
    }
}
