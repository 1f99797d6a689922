//! REST API endpoints.
//!
//! Axum-based HTTP API for the leaderboard, player pages, tier list and
//! match ingestion.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::ingest::{ErrorKind, IngestError};
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Upstream error: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn cause(&self) -> ErrorKind {
        match self {
            ApiError::NotFound(_) | ApiError::BadRequest(_) | ApiError::Unprocessable(_) => {
                ErrorKind::Validation
            }
            ApiError::Conflict(_) => ErrorKind::Duplicate,
            ApiError::BadGateway(_) => ErrorKind::Upstream,
            ApiError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        let message = e.to_string();
        match e {
            IngestError::InvalidMatchReference(_) => ApiError::BadRequest(message),
            IngestError::Schema(_) => ApiError::Unprocessable(message),
            IngestError::Duplicate(_) => ApiError::Conflict(message),
            IngestError::Provider(_) => ApiError::BadGateway(message),
            IngestError::Storage(_) => ApiError::Internal(message),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub cause: ErrorKind,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "DUPLICATE_MATCH"),
            ApiError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_MATCH"),
            ApiError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            error!("{}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                cause: self.cause(),
            },
        };

        (status, Json(body)).into_response()
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!(origin, "Invalid CORS origin, allowing none");
            layer
        }
    }
}

/// Build the router with every API route.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/leaderboard", get(routes::leaderboard::leaderboard))
        .route("/api/players/:puuid", get(routes::players::profile))
        .route("/api/players/:puuid/badges", get(routes::players::badges))
        .route("/api/players/:puuid/agents", get(routes::players::agents))
        .route("/api/players/:puuid/maps", get(routes::players::maps))
        .route("/api/players/:puuid/matches", get(routes::players::matches))
        .route("/api/tiers", get(routes::tiers::tier_list))
        .route(
            "/api/matches",
            get(routes::matches::list).post(routes::matches::ingest),
        )
        .route("/api/matches/:match_id", get(routes::matches::detail))
        .route("/api/badges", get(routes::badges::catalog))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn start_server(host: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Leaderboard API listening on http://{}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    use super::state::AppState;
    use crate::ingest::Ingestor;
    use crate::provider::MockProvider;
    use crate::storage::{MatchStore, StorageConfig};

    pub fn setup_test_state(dir: &std::path::Path, provider: MockProvider) -> AppState {
        let store = Arc::new(MatchStore::open(StorageConfig::new(dir.to_path_buf())).unwrap());
        let ingestor = Ingestor::new(store.clone(), Arc::new(provider));
        AppState::new(store, ingestor, "*")
    }

    /// State with the sample match already ingested under `match_id`.
    pub fn seeded_state(dir: &TempDir, match_id: &str) -> AppState {
        let state = setup_test_state(dir.path(), MockProvider::new());
        let payload = crate::normalize::raw::sample_match_json(match_id).to_string();
        state.ingestor.ingest_payload(&payload).unwrap();
        state
    }

    async fn into_json(resp: axum::response::Response) -> (StatusCode, Value) {
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        into_json(resp).await
    }

    pub async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        into_json(resp).await
    }
}
