//! Per-player endpoints.
//!
//! An unknown puuid is not an error here: the profile is `null` and every
//! list is empty.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::state::AppState;
use crate::calculate::report;
use crate::models::{BadgeInfo, GroupStats, MatchHistoryEntry, PlayerProfile, Puuid};

pub async fn profile(
    State(state): State<AppState>,
    Path(puuid): Path<String>,
) -> Json<Option<PlayerProfile>> {
    let snapshot = state.store.snapshot();
    Json(report::player_profile(&snapshot, &Puuid::new(puuid)))
}

pub async fn badges(
    State(state): State<AppState>,
    Path(puuid): Path<String>,
) -> Json<Vec<BadgeInfo>> {
    let snapshot = state.store.snapshot();
    Json(report::player_badges(&snapshot, &Puuid::new(puuid)))
}

pub async fn agents(
    State(state): State<AppState>,
    Path(puuid): Path<String>,
) -> Json<Vec<GroupStats>> {
    let snapshot = state.store.snapshot();
    Json(report::agent_stats(&snapshot, &Puuid::new(puuid)))
}

pub async fn maps(
    State(state): State<AppState>,
    Path(puuid): Path<String>,
) -> Json<Vec<GroupStats>> {
    let snapshot = state.store.snapshot();
    Json(report::map_stats(&snapshot, &Puuid::new(puuid)))
}

pub async fn matches(
    State(state): State<AppState>,
    Path(puuid): Path<String>,
) -> Json<Vec<MatchHistoryEntry>> {
    let snapshot = state.store.snapshot();
    Json(report::match_history(&snapshot, &Puuid::new(puuid)))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_helpers::*;
    use crate::test_support::MATCH_ID;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_profile() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(seeded_state(&tmp, MATCH_ID));

        let (status, json) = get_json(app, "/api/players/p-alpha").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["puuid"], "p-alpha");
        assert_eq!(json["name"], "Alpha");
        assert_eq!(json["tag"], "NA1");
        assert_eq!(json["total_games"], 1);
        assert_eq!(json["wins"], 1);
        assert_eq!(json["kills"], 7);
        assert_eq!(json["avg_acs"], 300);
    }

    #[tokio::test]
    async fn test_unknown_player_is_null_or_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let state = seeded_state(&tmp, MATCH_ID);

        let (status, json) = get_json(build_router(state.clone()), "/api/players/ghost").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, Value::Null);

        for suffix in ["badges", "agents", "maps", "matches"] {
            let uri = format!("/api/players/ghost/{suffix}");
            let (status, json) = get_json(build_router(state.clone()), &uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(json, json!([]), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_badges() {
        let tmp = tempfile::tempdir().unwrap();
        let state = seeded_state(&tmp, MATCH_ID);

        let (status, json) = get_json(build_router(state.clone()), "/api/players/p-alpha/badges").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["id"].as_str().unwrap())
            .collect();
        assert!(ids.contains(&"raid-boss"));
        assert!(!ids.contains(&"bottomest-frag"));

        let (_, json) = get_json(build_router(state), "/api/players/p-delta/badges").await;
        let ids: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["id"].as_str().unwrap())
            .collect();
        assert!(ids.contains(&"bottomest-frag"));
        assert!(!ids.contains(&"raid-boss"));
    }

    #[tokio::test]
    async fn test_agents_and_maps() {
        let tmp = tempfile::tempdir().unwrap();
        let state = seeded_state(&tmp, MATCH_ID);

        let (_, agents) = get_json(build_router(state.clone()), "/api/players/p-charlie/agents").await;
        assert_eq!(agents[0]["name"], "Reyna");
        assert_eq!(agents[0]["games"], 1);
        assert_eq!(agents[0]["win_rate"], 0.0);

        let (_, maps) = get_json(build_router(state), "/api/players/p-charlie/maps").await;
        assert_eq!(maps[0]["name"], "Ascent");
        assert_eq!(maps[0]["kd"], 1.0);
    }

    #[tokio::test]
    async fn test_match_history() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(seeded_state(&tmp, MATCH_ID));

        let (status, json) = get_json(app, "/api/players/p-alpha/matches").await;
        assert_eq!(status, StatusCode::OK);

        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["match_id"], MATCH_ID);
        assert_eq!(rows[0]["map"], "Ascent");
        assert_eq!(rows[0]["agent"], "Jett");
        assert_eq!(rows[0]["won"], true);
        assert_eq!(rows[0]["top_frag"], true);
        assert_eq!(rows[0]["bottom_frag"], false);
    }
}
