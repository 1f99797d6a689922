//! Badge catalog.

use axum::Json;

use crate::calculate::BADGES;
use crate::models::BadgeInfo;

/// Every badge in catalog order.
pub async fn catalog() -> Json<Vec<BadgeInfo>> {
    Json(BADGES.iter().map(|b| b.info()).collect())
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_helpers::*;
    use crate::provider::MockProvider;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_catalog_lists_all_badges() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path(), MockProvider::new()));

        let (status, json) = get_json(app, "/api/badges").await;
        assert_eq!(status, StatusCode::OK);

        let badges = json.as_array().unwrap();
        assert_eq!(badges.len(), 13);
        assert_eq!(badges[0]["id"], "raid-boss");
        assert_eq!(badges[0]["category"], "achievement");
        assert_eq!(badges[12]["id"], "carried");
        assert_eq!(badges[12]["category"], "derisive");
    }
}
