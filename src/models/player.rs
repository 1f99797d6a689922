//! Player identity and per-match player rows.

use serde::{Deserialize, Serialize};

use super::{Match, MatchId, PlayerMatchId, Puuid, Side};

/// A player known to the leaderboard.
///
/// The `puuid` is the durable key; name and tag follow the most recent sighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub puuid: Puuid,
    pub name: String,
    pub tag: String,
}

impl Player {
    pub fn new(puuid: impl Into<Puuid>, name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            puuid: puuid.into(),
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// "name#tag" as shown in game.
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.name, self.tag)
    }
}

/// One player's line in one match.
///
/// `avg_combat_score` and `econ_rating` are fixed at normalization time and
/// must never be re-derived from career totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatch {
    pub id: PlayerMatchId,
    pub match_id: MatchId,
    pub puuid: Puuid,
    pub team: Side,
    pub agent: String,

    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub score: u32,
    pub damage: u32,
    pub headshots: u32,
    pub bodyshots: u32,
    pub legshots: u32,

    /// round(score / rounds), 0 when no rounds were played
    pub avg_combat_score: u32,

    /// Damage per credit spent, 2 decimals
    pub econ_rating: f64,
    pub spent_credits: u32,
    pub loadout_value: u32,

    pub first_bloods: u32,
    pub first_deaths: u32,
    pub plants: u32,
    pub defuses: u32,
    pub clutches: u32,
    pub clutches_lost: u32,

    pub won: bool,
    pub top_frag: bool,
    pub bottom_frag: bool,
}

/// A player's match row joined with the match it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct Appearance<'a> {
    pub record: &'a PlayerMatch,
    pub game: &'a Match,
}

impl<'a> Appearance<'a> {
    pub fn new(record: &'a PlayerMatch, game: &'a Match) -> Self {
        Self { record, game }
    }
}
