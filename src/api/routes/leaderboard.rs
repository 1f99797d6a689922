//! Career leaderboard endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::calculate::report;
use crate::models::LeaderboardEntry;

/// Career leaderboard, best win rate first.
pub async fn leaderboard(State(state): State<AppState>) -> Json<Vec<LeaderboardEntry>> {
    let snapshot = state.store.snapshot();
    Json(report::leaderboard(&snapshot))
}
