//! Match-data provider client.
//!
//! The ingestion pipeline talks to the provider through [`MatchProvider`], so
//! the HTTP client can be swapped for a canned one in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ProviderConfig;
use crate::models::MatchId;

/// Errors that can occur while fetching a match.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid provider URL: {0}")]
    InvalidUrl(String),

    #[error("Provider API key is not a valid header value")]
    InvalidApiKey,

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Provider returned status {status} in response body")]
    Envelope { status: u16 },

    #[error("Provider response has no envelope status: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ProviderError {
    /// Status code reported by the provider, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::HttpStatus { status, .. } | ProviderError::Envelope { status } => {
                Some(*status)
            }
            ProviderError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A fetched match body whose envelope reported success.
///
/// The match payload inside is not decoded here; that is the normalizer's job.
#[derive(Debug, Clone)]
pub struct FetchedMatch {
    pub body: String,
}

#[async_trait]
pub trait MatchProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    async fn fetch_match(&self, match_id: &MatchId) -> Result<FetchedMatch, ProviderError>;
}

#[derive(Deserialize)]
struct EnvelopeStatus {
    status: u16,
}

/// Check the `status` of a `{status, data}` response body.
pub fn check_envelope(body: &str) -> Result<(), ProviderError> {
    let head: EnvelopeStatus = serde_json::from_str(body)?;
    if head.status != 200 {
        return Err(ProviderError::Envelope {
            status: head.status,
        });
    }
    Ok(())
}

/// HenrikDev Valorant API client.
pub struct HenrikProvider {
    client: Client,
    base_url: Url,
    region: String,
}

impl HenrikProvider {
    pub fn new(
        base_url: &str,
        region: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ProviderError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("valo-ladder/", env!("CARGO_PKG_VERSION"))),
        );
        match api_key {
            Some(key) => {
                let value =
                    HeaderValue::from_str(&key).map_err(|_| ProviderError::InvalidApiKey)?;
                headers.insert(AUTHORIZATION, value);
            }
            None => warn!("No provider API key configured; requests may be rejected"),
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            region: region.into(),
        })
    }

    /// Build from configuration, reading the API key from the configured
    /// environment variable.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(
            &config.base_url,
            config.region.clone(),
            api_key,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// `{base}/valorant/v4/match/{region}/{match_id}`
    pub fn match_url(&self, match_id: &MatchId) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["valorant", "v4", "match", self.region.as_str(), match_id.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl MatchProvider for HenrikProvider {
    fn name(&self) -> &'static str {
        "henrik"
    }

    async fn fetch_match(&self, match_id: &MatchId) -> Result<FetchedMatch, ProviderError> {
        let url = self.match_url(match_id)?;
        info!(%match_id, region = %self.region, "Fetching match from {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "Provider error response");
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        check_envelope(&body)?;
        debug!(%match_id, bytes = body.len(), "Fetched match payload");

        Ok(FetchedMatch { body })
    }
}

/// Provider serving canned payloads.
#[cfg(test)]
pub struct MockProvider {
    bodies: std::collections::HashMap<MatchId, String>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockProvider {
    pub fn new() -> Self {
        Self {
            bodies: std::collections::HashMap::new(),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Serve `body` as the response text for `match_id`.
    pub fn with_body(mut self, match_id: &str, body: impl Into<String>) -> Self {
        self.bodies.insert(match_id.into(), body.into());
        self
    }

    /// Serve a well-formed envelope around the sample match.
    pub fn with_sample(self, match_id: &str) -> Self {
        let envelope = serde_json::json!({
            "status": 200,
            "data": crate::normalize::raw::sample_match_json(match_id),
        });
        self.with_body(match_id, envelope.to_string())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl MatchProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_match(&self, match_id: &MatchId) -> Result<FetchedMatch, ProviderError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let body = self
            .bodies
            .get(match_id)
            .cloned()
            .ok_or_else(|| ProviderError::HttpStatus {
                status: 404,
                message: "Not Found".to_string(),
            })?;
        check_envelope(&body)?;
        Ok(FetchedMatch { body })
    }
}
