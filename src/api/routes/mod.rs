pub mod badges;
pub mod leaderboard;
pub mod matches;
pub mod players;
pub mod tiers;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub matches: usize,
    pub players: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.snapshot();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        matches: snapshot.match_count(),
        players: snapshot.player_count(),
    })
}
