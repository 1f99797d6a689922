//! Derived statistics models.
//!
//! Everything here is recomputed from stored match rows on demand and never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Appearance, MatchId, Player, Puuid, Side};

/// Tier classification based on the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
    D,
}

impl Tier {
    /// All tiers, best first.
    pub const ALL: [Tier; 5] = [Tier::S, Tier::A, Tier::B, Tier::C, Tier::D];

    /// Calculate tier from a composite score. Lower bounds are inclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= 1.0 {
            Tier::S
        } else if score >= 0.3 {
            Tier::A
        } else if score >= -0.3 {
            Tier::B
        } else if score >= -1.0 {
            Tier::C
        } else {
            Tier::D
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::S => write!(f, "S"),
            Tier::A => write!(f, "A"),
            Tier::B => write!(f, "B"),
            Tier::C => write!(f, "C"),
            Tier::D => write!(f, "D"),
        }
    }
}

/// Career statistics for one player (or one group of matches).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,

    /// Percent, 1 decimal
    pub win_rate: f64,

    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,

    /// 2 decimals; raw kills when there are no deaths
    pub kd: f64,

    /// Mean of the per-match ACS values
    pub avg_acs: u32,

    /// Damage per game
    pub avg_damage: u32,

    /// Percent of all shots, 1 decimal
    pub headshot_percent: f64,

    /// Percent of all shots, 1 decimal
    pub leg_shot_percent: f64,

    pub first_bloods: u32,
    pub first_deaths: u32,

    /// First bloods per game as a percentage, 1 decimal
    pub first_blood_share: f64,

    pub plants: u32,
    pub defuses: u32,
    pub clutches: u32,
    pub clutches_lost: u32,

    /// Percent of clutch attempts won, 1 decimal
    pub clutch_win_rate: f64,

    /// Mean per-match damage per credit, 2 decimals
    pub economy_rating: f64,
}

/// Per-agent or per-map breakdown row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    /// Agent or map name
    pub name: String,
    pub games: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub kd: f64,
    pub avg_acs: u32,
}

/// One row of the career leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub puuid: Puuid,
    pub name: String,
    pub tag: String,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub kd: f64,
    pub avg_acs: u32,
    pub headshot_percent: f64,
}

/// A player together with their career statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(flatten)]
    pub player: Player,
    #[serde(flatten)]
    pub stats: PlayerStats,
}

/// One row of a player's match history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchHistoryEntry {
    pub match_id: MatchId,
    pub map: String,
    pub started_at: DateTime<Utc>,
    pub team: Side,
    pub agent: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub avg_combat_score: u32,
    pub won: bool,
    pub top_frag: bool,
    pub bottom_frag: bool,
}

impl From<Appearance<'_>> for MatchHistoryEntry {
    fn from(a: Appearance<'_>) -> Self {
        Self {
            match_id: a.game.id.clone(),
            map: a.game.map.clone(),
            started_at: a.game.started_at,
            team: a.record.team,
            agent: a.record.agent.clone(),
            kills: a.record.kills,
            deaths: a.record.deaths,
            assists: a.record.assists,
            avg_combat_score: a.record.avg_combat_score,
            won: a.record.won,
            top_frag: a.record.top_frag,
            bottom_frag: a.record.bottom_frag,
        }
    }
}

/// One player's position in the tier list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierListEntry {
    pub puuid: Puuid,
    pub name: String,
    pub tag: String,
    pub tier: Tier,

    /// 3 decimals; `tier` is taken from the unrounded score
    pub composite_score: f64,

    /// Recent-window metrics, display rounded
    pub kd: f64,
    pub adr: u32,
    pub acs: u32,
    pub win_rate: f64,

    /// Matches in the recent window (1 to 3)
    pub games_used: u32,

    pub best_agent: Option<String>,
}

/// Players of one tier, in score order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierGroup {
    pub tier: Tier,
    pub players: Vec<TierListEntry>,
}

/// Full tier-list snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierList {
    /// All ranked players, best composite score first
    pub players: Vec<TierListEntry>,

    /// Same players partitioned S through D
    pub tiers: Vec<TierGroup>,
}

impl TierList {
    /// Build a tier list from already sorted entries.
    pub fn from_sorted(players: Vec<TierListEntry>) -> Self {
        let tiers = Tier::ALL
            .iter()
            .map(|&tier| TierGroup {
                tier,
                players: players.iter().filter(|p| p.tier == tier).cloned().collect(),
            })
            .collect();
        Self { players, tiers }
    }

    /// Get players in a specific tier.
    pub fn in_tier(&self, tier: Tier) -> &[TierListEntry] {
        self.tiers
            .iter()
            .find(|g| g.tier == tier)
            .map(|g| g.players.as_slice())
            .unwrap_or(&[])
    }
}
