//! Raw match payload as delivered by the match-data provider.
//!
//! Only the fields the normalizer reads are modelled; everything else in the
//! provider response is ignored. Fields whose absence is a schema violation
//! are `Option` so the normalizer can report them precisely instead of
//! failing inside serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEnvelope {
    pub status: u16,
    pub data: RawMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMatch {
    pub metadata: RawMetadata,
    #[serde(default)]
    pub players: Vec<RawPlayer>,
    #[serde(default)]
    pub teams: Option<Vec<RawTeam>>,
    #[serde(default)]
    pub rounds: Option<Vec<RawRound>>,
    #[serde(default)]
    pub kills: Option<Vec<RawKill>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMetadata {
    pub match_id: String,
    pub map: RawNamed,
    pub started_at: DateTime<Utc>,
}

/// `{ "id": ..., "name": ... }` pairs used for maps and agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNamed {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlayer {
    pub puuid: String,
    pub name: String,
    pub tag: String,
    pub team_id: String,
    pub agent: RawNamed,
    #[serde(default)]
    pub stats: Option<RawPlayerStats>,
    #[serde(default)]
    pub economy: Option<RawEconomy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlayerStats {
    pub score: Option<u32>,
    pub kills: Option<u32>,
    pub deaths: Option<u32>,
    pub assists: Option<u32>,
    pub headshots: Option<u32>,
    pub bodyshots: Option<u32>,
    pub legshots: Option<u32>,
    pub damage: Option<RawDamage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDamage {
    pub dealt: Option<u32>,
    #[serde(default)]
    pub received: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEconomy {
    pub spent: RawEconomyTotal,
    pub loadout_value: RawEconomyTotal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEconomyTotal {
    pub overall: u32,
    #[serde(default)]
    pub average: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTeam {
    pub team_id: String,
    pub rounds: RawTeamRounds,
    pub won: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTeamRounds {
    pub won: u32,
    pub lost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRound {
    #[serde(default)]
    pub id: u32,
    pub winning_team: String,
    #[serde(default)]
    pub plant: Option<RawBombEvent>,
    #[serde(default)]
    pub defuse: Option<RawBombEvent>,
    #[serde(default)]
    pub stats: Option<Vec<RawRoundPlayerStats>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBombEvent {
    pub player: RawRoundPlayer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRoundPlayer {
    pub puuid: String,
    pub team: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRoundPlayerStats {
    pub player: RawRoundPlayer,
    pub stats: RawRoundStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRoundStats {
    pub kills: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawKill {
    pub round: u32,
    pub time_in_round_in_ms: u64,
    pub killer: RawKillParty,
    pub victim: RawKillParty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawKillParty {
    pub puuid: String,
}

/// A small but complete two-team match used across the test suites.
///
/// Red (Alpha, Bravo) beats Blue (Charlie, Delta) 2-1.
#[cfg(test)]
pub(crate) fn sample_match_json(match_id: &str) -> serde_json::Value {
    use serde_json::json;

    #[allow(clippy::too_many_arguments)]
    fn player(
        puuid: &str,
        name: &str,
        team: &str,
        agent: &str,
        score: u32,
        kda: (u32, u32, u32),
        shots: (u32, u32, u32),
        damage: u32,
        spent: Option<u32>,
    ) -> serde_json::Value {
        let mut p = json!({
            "puuid": puuid,
            "name": name,
            "tag": "NA1",
            "team_id": team,
            "agent": { "id": agent.to_lowercase(), "name": agent },
            "stats": {
                "score": score,
                "kills": kda.0,
                "deaths": kda.1,
                "assists": kda.2,
                "headshots": shots.0,
                "bodyshots": shots.1,
                "legshots": shots.2,
                "damage": { "dealt": damage, "received": 0 }
            }
        });
        if let Some(spent) = spent {
            p["economy"] = json!({
                "spent": { "overall": spent, "average": 0.0 },
                "loadout_value": { "overall": spent + 1000, "average": 0.0 }
            });
        }
        p
    }

    fn round_player(puuid: &str, team: &str, kills: u32) -> serde_json::Value {
        json!({ "player": { "puuid": puuid, "team": team }, "stats": { "kills": kills } })
    }

    fn kill(round: u32, time: u64, killer: &str, victim: &str) -> serde_json::Value {
        json!({
            "round": round,
            "time_in_round_in_ms": time,
            "killer": { "puuid": killer },
            "victim": { "puuid": victim }
        })
    }

    json!({
        "metadata": {
            "match_id": match_id,
            "map": { "id": "ascent", "name": "Ascent" },
            "started_at": "2025-06-01T18:00:00Z"
        },
        "players": [
            player("p-alpha", "Alpha", "Red", "Jett", 900, (7, 2, 1), (10, 20, 5), 800, Some(6000)),
            player("p-bravo", "Bravo", "Red", "Sage", 300, (2, 3, 4), (2, 10, 3), 250, None),
            player("p-charlie", "Charlie", "Blue", "Reyna", 600, (4, 4, 0), (5, 15, 0), 500, Some(5000)),
            player("p-delta", "Delta", "Blue", "Omen", 300, (1, 5, 2), (1, 8, 1), 150, Some(4000)),
        ],
        "teams": [
            { "team_id": "Red", "rounds": { "won": 2, "lost": 1 }, "won": true },
            { "team_id": "Blue", "rounds": { "won": 1, "lost": 2 }, "won": false }
        ],
        "rounds": [
            {
                "id": 0,
                "winning_team": "Red",
                "plant": { "player": { "puuid": "p-bravo", "team": "Red" } },
                "stats": [
                    round_player("p-alpha", "Red", 2),
                    round_player("p-bravo", "Red", 0),
                    round_player("p-charlie", "Blue", 1),
                    round_player("p-delta", "Blue", 0)
                ]
            },
            {
                "id": 1,
                "winning_team": "Blue",
                "plant": { "player": { "puuid": "p-alpha", "team": "Red" } },
                "defuse": { "player": { "puuid": "p-charlie", "team": "Blue" } },
                "stats": [
                    round_player("p-alpha", "Red", 3),
                    round_player("p-bravo", "Red", 1),
                    round_player("p-charlie", "Blue", 1),
                    round_player("p-delta", "Blue", 1)
                ]
            },
            {
                "id": 2,
                "winning_team": "Red",
                "stats": [
                    round_player("p-alpha", "Red", 2),
                    round_player("p-bravo", "Red", 0),
                    round_player("p-charlie", "Blue", 0),
                    round_player("p-delta", "Blue", 2)
                ]
            }
        ],
        "kills": [
            kill(0, 5000, "p-alpha", "p-charlie"),
            kill(0, 3000, "p-charlie", "p-bravo"),
            kill(1, 2000, "p-alpha", "p-delta"),
            kill(1, 2000, "p-delta", "p-alpha"),
            kill(2, 1000, "p-delta", "p-alpha")
        ]
    })
}
