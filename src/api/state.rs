use std::sync::Arc;

use crate::ingest::Ingestor;
use crate::storage::MatchStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MatchStore>,
    pub ingestor: Ingestor,
    /// Allowed CORS origin; "*" allows any
    pub cors_origin: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<MatchStore>, ingestor: Ingestor, cors_origin: &str) -> Self {
        Self {
            store,
            ingestor,
            cors_origin: Arc::from(cors_origin),
        }
    }
}
