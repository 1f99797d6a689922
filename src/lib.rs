//! # Valo Ladder
//!
//! A private Valorant leaderboard: ingests finished matches from a match-data
//! provider and derives career statistics, badges and tier lists from them.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (matches, players, per-match rows, derived stats)
//! - **normalize**: Raw provider schema and the match normalizer
//! - **calculate**: Aggregation, percentiles, badges and tier scoring
//! - **storage**: Filesystem data lake (JSONL match log, raw payload archive)
//! - **provider**: Match-data provider client
//! - **ingest**: Match reference to stored match pipeline
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use models::*;

use std::sync::OnceLock;

use regex::Regex;

const UUID_PATTERN: &str = "[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}";

fn reference_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(&format!(r"(?i)tracker\.gg/valorant/match/({UUID_PATTERN})")).unwrap(),
            Regex::new(&format!(r"(?i)/match/({UUID_PATTERN})")).unwrap(),
            Regex::new(&format!(r"(?i)^({UUID_PATTERN})$")).unwrap(),
        ]
    })
}

/// Extract a match id from a tracker URL, any URL with a `/match/<id>`
/// segment, or a bare id. The id is returned lowercased.
pub fn extract_match_id(input: &str) -> Option<MatchId> {
    let input = input.trim();
    reference_patterns()
        .iter()
        .find_map(|re| re.captures(input))
        .and_then(|caps| caps.get(1))
        .map(|m| MatchId::new(m.as_str().to_ascii_lowercase()))
}

/// Whether `id` has the 8-4-4-4-12 hex form of a provider match id.
///
/// `Uuid::parse_str` also takes the simple, braced and URN forms, so the
/// hyphenated layout is checked first.
pub fn is_valid_match_id(id: &str) -> bool {
    const HYPHENS: [usize; 4] = [8, 13, 18, 23];
    id.len() == 36
        && HYPHENS.iter().all(|&i| id.as_bytes()[i] == b'-')
        && uuid::Uuid::parse_str(id).is_ok()
}
