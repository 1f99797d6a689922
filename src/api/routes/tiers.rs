//! Tier list endpoint.
//!
//! Scores every player on their most recent matches; the tier list is
//! rebuilt from the current snapshot on each request.

use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::calculate::report;
use crate::models::TierList;

/// Current tier list over every player's recent form.
pub async fn tier_list(State(state): State<AppState>) -> Json<TierList> {
    let snapshot = state.store.snapshot();
    Json(report::tier_list(&snapshot))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_helpers::*;
    use crate::provider::MockProvider;
    use crate::test_support::MATCH_ID;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_tier_list_empty_store() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path(), MockProvider::new()));

        let (status, json) = get_json(app, "/api/tiers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["players"].as_array().unwrap().len(), 0);

        let tiers: Vec<&str> = json["tiers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["tier"].as_str().unwrap())
            .collect();
        assert_eq!(tiers, vec!["S", "A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_tier_list_partitions_players() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(seeded_state(&tmp, MATCH_ID));

        let (status, json) = get_json(app, "/api/tiers").await;
        assert_eq!(status, StatusCode::OK);

        let players = json["players"].as_array().unwrap();
        assert_eq!(players.len(), 4);
        assert_eq!(players[0]["puuid"], "p-alpha");
        assert_eq!(players[0]["games_used"], 1);
        assert_eq!(players[0]["best_agent"], "Jett");

        let scores: Vec<f64> = players
            .iter()
            .map(|p| p["composite_score"].as_f64().unwrap())
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        let grouped: usize = json["tiers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["players"].as_array().unwrap().len())
            .sum();
        assert_eq!(grouped, 4);
    }
}
