//! Shared fixtures for unit tests.

use chrono::{Duration, TimeZone, Utc};

use crate::models::{player_match_id, Match, PlayerMatch, Side};

/// Provider-shaped match ids for fixtures that go through the normalizer.
pub const MATCH_ID: &str = "320b7150-9769-492a-a8ad-e31d95818838";
pub const OTHER_MATCH_ID: &str = "8f6b3a2c-1d4e-4f5a-9b7c-0e1d2c3b4a59";

/// A red-won match on `map`, started `day` days after 2025-06-01.
pub fn game(id: &str, map: &str, day: i64, rounds: u32) -> Match {
    Match {
        id: id.into(),
        map: map.to_string(),
        started_at: Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap() + Duration::days(day),
        rounds,
        red_won: true,
        blue_won: false,
    }
}

/// An all-zero red-side row; override fields with struct update syntax.
pub fn record(puuid: &str, match_id: &str) -> PlayerMatch {
    PlayerMatch {
        id: player_match_id(&match_id.into(), &puuid.into()),
        match_id: match_id.into(),
        puuid: puuid.into(),
        team: Side::Red,
        agent: "Jett".to_string(),
        kills: 0,
        deaths: 0,
        assists: 0,
        score: 0,
        damage: 0,
        headshots: 0,
        bodyshots: 0,
        legshots: 0,
        avg_combat_score: 0,
        econ_rating: 0.0,
        spent_credits: 0,
        loadout_value: 0,
        first_bloods: 0,
        first_deaths: 0,
        plants: 0,
        defuses: 0,
        clutches: 0,
        clutches_lost: 0,
        won: false,
        top_frag: false,
        bottom_frag: false,
    }
}
