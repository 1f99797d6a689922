//! Match listing and ingestion endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::ingest::IngestOutcome;
use crate::models::{MatchId, PlayerMatch, Side};

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    /// Tracker URL or bare match id
    pub url: String,
}

/// Add a match by reference.
pub async fn ingest(
    State(state): State<AppState>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestOutcome>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let outcome = state.ingestor.ingest_reference(&request.url).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub map: String,
    pub started_at: DateTime<Utc>,
    pub rounds: u32,
    pub winner: Option<Side>,
    pub players: usize,
}

/// Every stored match, newest first.
pub async fn list(State(state): State<AppState>) -> Json<Vec<MatchSummary>> {
    let snapshot = state.store.snapshot();
    let mut summaries: Vec<MatchSummary> = snapshot
        .matches()
        .map(|m| MatchSummary {
            match_id: m.id.clone(),
            map: m.map.clone(),
            started_at: m.started_at,
            rounds: m.rounds,
            winner: m.winner(),
            players: snapshot.match_records(&m.id).len(),
        })
        .collect();
    summaries.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    Json(summaries)
}

#[derive(Debug, Serialize)]
pub struct MatchPlayer {
    pub name: String,
    pub tag: String,
    #[serde(flatten)]
    pub record: PlayerMatch,
}

#[derive(Debug, Serialize)]
pub struct MatchDetail {
    pub match_id: MatchId,
    pub map: String,
    pub started_at: DateTime<Utc>,
    pub rounds: u32,
    pub winner: Option<Side>,
    pub players: Vec<MatchPlayer>,
}

/// One stored match with every player's line.
pub async fn detail(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchDetail>, ApiError> {
    let snapshot = state.store.snapshot();
    let id = MatchId::new(match_id.to_ascii_lowercase());
    let game = snapshot
        .get_match(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Match {id}")))?;

    let players = snapshot
        .match_records(&id)
        .into_iter()
        .map(|record| {
            let (name, tag) = snapshot
                .player(&record.puuid)
                .map(|p| (p.name.clone(), p.tag.clone()))
                .unwrap_or_default();
            MatchPlayer {
                name,
                tag,
                record: record.clone(),
            }
        })
        .collect();

    Ok(Json(MatchDetail {
        match_id: game.id.clone(),
        map: game.map.clone(),
        started_at: game.started_at,
        rounds: game.rounds,
        winner: game.winner(),
        players,
    }))
}
