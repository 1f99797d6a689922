//! Match normalizer.
//!
//! Turns one raw provider payload into a canonical [`Match`] and one
//! [`PlayerMatch`] per player, deriving the per-match fields that are never
//! recomputed later:
//! - average combat score and economy rating
//! - first bloods / first deaths from the kill feed
//! - plants, defuses and (heuristic) clutches from the round list
//! - top / bottom frag flags
//!
//! Anything structurally wrong with the payload is a [`SchemaError`] and the
//! match never reaches storage.

pub mod raw;

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, warn};

use crate::calculate::round_to;
use crate::is_valid_match_id;
use crate::models::{
    player_match_id, Match, MatchBundle, MatchId, Player, PlayerEntry, PlayerMatch, Side,
};

use raw::{RawKill, RawMatch, RawPlayer, RawRound, RawTeam};

/// Errors for payloads that do not match the expected schema.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("Malformed match payload: {0}")]
    Malformed(String),

    #[error("Match payload has no match id")]
    MissingMatchId,

    #[error("Match id '{0}' is not a provider match UUID")]
    InvalidMatchId(String),

    #[error("Match payload has no team list")]
    MissingTeams,

    #[error("Team list is missing the {0} side")]
    MissingSide(Side),

    #[error("Invalid match outcome: red_won={red_won}, blue_won={blue_won}")]
    InvalidOutcome { red_won: bool, blue_won: bool },

    #[error("Match payload has no players")]
    NoPlayers,

    #[error("Player {puuid} appears more than once")]
    DuplicatePlayer { puuid: String },

    #[error("Player {puuid} has unknown team '{team_id}'")]
    UnknownTeam { puuid: String, team_id: String },

    #[error("Player {puuid} is missing required field '{field}'")]
    MissingField { puuid: String, field: &'static str },
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::Malformed(e.to_string())
    }
}

/// Parse a raw match payload from JSON text.
///
/// Accepts the bare match object or the provider's `{status, data}` envelope.
pub fn parse_raw_match(json: &str) -> Result<RawMatch, SchemaError> {
    let mut value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("status").is_some() {
        if let Some(data) = value.get_mut("data") {
            return Ok(serde_json::from_value(data.take())?);
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Per-player counters derived from the round and kill event lists.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct EventCounts {
    first_bloods: u32,
    first_deaths: u32,
    plants: u32,
    defuses: u32,
    clutches: u32,
    clutches_lost: u32,
}

/// Required per-player stat block, after presence checks.
struct StatLine {
    score: u32,
    kills: u32,
    deaths: u32,
    assists: u32,
    headshots: u32,
    bodyshots: u32,
    legshots: u32,
    damage: u32,
}

/// Normalize one raw match into a storable bundle.
pub fn normalize_match(raw: &RawMatch) -> Result<MatchBundle, SchemaError> {
    let match_id = raw.metadata.match_id.trim();
    if match_id.is_empty() {
        return Err(SchemaError::MissingMatchId);
    }
    if !is_valid_match_id(match_id) {
        return Err(SchemaError::InvalidMatchId(match_id.to_string()));
    }

    let teams = raw.teams.as_deref().ok_or(SchemaError::MissingTeams)?;
    let red = find_team(teams, Side::Red)?;
    let blue = find_team(teams, Side::Blue)?;

    if red.won == blue.won {
        return Err(SchemaError::InvalidOutcome {
            red_won: red.won,
            blue_won: blue.won,
        });
    }

    if raw.players.is_empty() {
        return Err(SchemaError::NoPlayers);
    }

    let game = Match {
        id: MatchId::new(match_id.to_ascii_lowercase()),
        map: raw.metadata.map.name.clone(),
        started_at: raw.metadata.started_at,
        rounds: team_rounds(red),
        red_won: red.won,
        blue_won: blue.won,
    };

    let mut counts: HashMap<&str, EventCounts> = HashMap::new();
    if let Some(kills) = raw.kills.as_deref() {
        count_first_engagements(kills, &mut counts);
    }
    if let Some(rounds) = raw.rounds.as_deref() {
        count_round_events(rounds, &mut counts);
    }

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(raw.players.len());

    for p in &raw.players {
        if !seen.insert(p.puuid.as_str()) {
            return Err(SchemaError::DuplicatePlayer {
                puuid: p.puuid.clone(),
            });
        }

        let team = Side::from_label(&p.team_id).ok_or_else(|| SchemaError::UnknownTeam {
            puuid: p.puuid.clone(),
            team_id: p.team_id.clone(),
        })?;
        let stats = stat_line(p)?;
        let rounds = match team {
            Side::Red => team_rounds(red),
            Side::Blue => team_rounds(blue),
        };

        let (spent_credits, loadout_value) = p
            .economy
            .as_ref()
            .map(|e| (e.spent.overall, e.loadout_value.overall))
            .unwrap_or((0, 0));

        let events = counts.get(p.puuid.as_str()).copied().unwrap_or_default();
        let puuid = p.puuid.as_str().into();

        let record = PlayerMatch {
            id: player_match_id(&game.id, &puuid),
            match_id: game.id.clone(),
            puuid,
            team,
            agent: p.agent.name.clone(),
            kills: stats.kills,
            deaths: stats.deaths,
            assists: stats.assists,
            score: stats.score,
            damage: stats.damage,
            headshots: stats.headshots,
            bodyshots: stats.bodyshots,
            legshots: stats.legshots,
            avg_combat_score: average_combat_score(stats.score, rounds),
            econ_rating: economy_rating(stats.damage, spent_credits),
            spent_credits,
            loadout_value,
            first_bloods: events.first_bloods,
            first_deaths: events.first_deaths,
            plants: events.plants,
            defuses: events.defuses,
            clutches: events.clutches,
            clutches_lost: events.clutches_lost,
            won: game.side_won(team),
            top_frag: false,
            bottom_frag: false,
        };

        entries.push(PlayerEntry {
            player: Player::new(p.puuid.as_str(), p.name.clone(), p.tag.clone()),
            record,
        });
    }

    mark_frag_extremes(&mut entries);

    debug!(
        "Normalized match {} on {} ({} players, {} rounds)",
        game.id,
        game.map,
        entries.len(),
        game.rounds
    );

    Ok(MatchBundle { game, entries })
}

fn find_team(teams: &[RawTeam], side: Side) -> Result<&RawTeam, SchemaError> {
    teams
        .iter()
        .find(|t| t.team_id == side.label())
        .ok_or(SchemaError::MissingSide(side))
}

fn team_rounds(team: &RawTeam) -> u32 {
    team.rounds.won + team.rounds.lost
}

fn stat_line(p: &RawPlayer) -> Result<StatLine, SchemaError> {
    let missing = |field: &'static str| SchemaError::MissingField {
        puuid: p.puuid.clone(),
        field,
    };

    let s = p.stats.as_ref().ok_or_else(|| missing("stats"))?;
    let damage = s
        .damage
        .as_ref()
        .and_then(|d| d.dealt)
        .ok_or_else(|| missing("stats.damage.dealt"))?;

    Ok(StatLine {
        score: s.score.ok_or_else(|| missing("stats.score"))?,
        kills: s.kills.ok_or_else(|| missing("stats.kills"))?,
        deaths: s.deaths.ok_or_else(|| missing("stats.deaths"))?,
        assists: s.assists.ok_or_else(|| missing("stats.assists"))?,
        headshots: s.headshots.ok_or_else(|| missing("stats.headshots"))?,
        bodyshots: s.bodyshots.ok_or_else(|| missing("stats.bodyshots"))?,
        legshots: s.legshots.ok_or_else(|| missing("stats.legshots"))?,
        damage,
    })
}

/// round(score / rounds); 0 when no rounds were recorded.
pub fn average_combat_score(score: u32, rounds: u32) -> u32 {
    if rounds == 0 {
        return 0;
    }
    (score as f64 / rounds as f64).round() as u32
}

/// Damage per credit spent, rounded to 2 decimals; 0 when nothing was spent.
pub fn economy_rating(damage: u32, spent_credits: u32) -> f64 {
    if spent_credits == 0 {
        return 0.0;
    }
    round_to(damage as f64 / spent_credits as f64, 2)
}

/// Credit the earliest kill of every round as a first blood / first death.
///
/// Kills within a round are ordered by in-round time; equal times keep
/// feed order.
fn count_first_engagements<'a>(kills: &'a [RawKill], counts: &mut HashMap<&'a str, EventCounts>) {
    let mut by_round: HashMap<u32, Vec<&RawKill>> = HashMap::new();
    for kill in kills {
        by_round.entry(kill.round).or_default().push(kill);
    }

    for round_kills in by_round.values_mut() {
        round_kills.sort_by_key(|k| k.time_in_round_in_ms);
        if let Some(first) = round_kills.first() {
            counts.entry(first.killer.puuid.as_str()).or_default().first_bloods += 1;
            counts.entry(first.victim.puuid.as_str()).or_default().first_deaths += 1;
        }
    }
}

/// Count plants, defuses and clutches per player from the round list.
///
/// Clutch detection is an approximation: the provider gives no alive-player
/// timeline, so a round counts as a clutch attempt when the player got at
/// least two kills and was the only player on their team to get any.
fn count_round_events<'a>(rounds: &'a [RawRound], counts: &mut HashMap<&'a str, EventCounts>) {
    for round in rounds {
        if let Some(plant) = &round.plant {
            counts.entry(plant.player.puuid.as_str()).or_default().plants += 1;
        }
        if let Some(defuse) = &round.defuse {
            counts.entry(defuse.player.puuid.as_str()).or_default().defuses += 1;
        }

        let Some(stats) = round.stats.as_deref() else {
            continue;
        };

        for line in stats.iter().filter(|s| s.stats.kills >= 2) {
            let team = line.player.team.as_str();
            let teammates_with_kills = stats
                .iter()
                .filter(|s| s.player.team == team && s.stats.kills > 0)
                .count();

            if teammates_with_kills != 1 {
                continue;
            }

            let entry = counts.entry(line.player.puuid.as_str()).or_default();
            if round.winning_team == team {
                entry.clutches += 1;
            } else {
                entry.clutches_lost += 1;
            }
        }
    }

    if rounds.iter().all(|r| r.stats.is_none()) && !rounds.is_empty() {
        warn!("Round list has no per-player stats; clutches cannot be detected");
    }
}

/// Flag the single highest and single lowest scorer. Ties go to whoever
/// appears first in the payload.
fn mark_frag_extremes(entries: &mut [PlayerEntry]) {
    let mut top: Option<usize> = None;
    let mut bottom: Option<usize> = None;

    for (i, entry) in entries.iter().enumerate() {
        let score = entry.record.score;
        if top.map_or(true, |t| score > entries[t].record.score) {
            top = Some(i);
        }
        if bottom.map_or(true, |b| score < entries[b].record.score) {
            bottom = Some(i);
        }
    }

    if let Some(t) = top {
        entries[t].record.top_frag = true;
    }
    if let Some(b) = bottom {
        entries[b].record.bottom_frag = true;
    }
}

#[cfg(test)]
mod tests {
    use super::raw::sample_match_json;
    use super::*;
    use crate::test_support::MATCH_ID;
    use pretty_assertions::assert_eq;

    fn sample() -> RawMatch {
        serde_json::from_value(sample_match_json(MATCH_ID)).unwrap()
    }

    fn record<'a>(bundle: &'a MatchBundle, puuid: &str) -> &'a PlayerMatch {
        &bundle
            .entries
            .iter()
            .find(|e| e.record.puuid.as_str() == puuid)
            .unwrap()
            .record
    }

    #[test]
    fn test_normalize_match_metadata() {
        let bundle = normalize_match(&sample()).unwrap();

        assert_eq!(bundle.game.id.as_str(), MATCH_ID);
        assert_eq!(bundle.game.map, "Ascent");
        assert_eq!(bundle.game.rounds, 3);
        assert!(bundle.game.red_won);
        assert!(!bundle.game.blue_won);
        assert_eq!(bundle.entries.len(), 4);
    }

    #[test]
    fn test_normalize_player_fields() {
        let bundle = normalize_match(&sample()).unwrap();
        let alpha = record(&bundle, "p-alpha");

        assert_eq!(alpha.team, Side::Red);
        assert_eq!(alpha.agent, "Jett");
        assert_eq!(alpha.kills, 7);
        assert_eq!(alpha.avg_combat_score, 300);
        assert_eq!(alpha.econ_rating, 0.13);
        assert_eq!(alpha.spent_credits, 6000);
        assert_eq!(alpha.loadout_value, 7000);
        assert!(alpha.won);
        assert_eq!(alpha.id, player_match_id(&MATCH_ID.into(), &"p-alpha".into()));

        let charlie = record(&bundle, "p-charlie");
        assert!(!charlie.won);
        assert_eq!(charlie.avg_combat_score, 200);
        assert_eq!(charlie.econ_rating, 0.1);
    }

    #[test]
    fn test_missing_economy_gives_zero_rating() {
        let bundle = normalize_match(&sample()).unwrap();
        let bravo = record(&bundle, "p-bravo");
        assert_eq!(bravo.econ_rating, 0.0);
        assert_eq!(bravo.spent_credits, 0);
    }

    #[test]
    fn test_first_bloods_use_earliest_kill_per_round() {
        let bundle = normalize_match(&sample()).unwrap();

        // Round 0: Charlie's kill at 3000ms beats Alpha's at 5000ms
        assert_eq!(record(&bundle, "p-charlie").first_bloods, 1);
        assert_eq!(record(&bundle, "p-bravo").first_deaths, 1);

        // Round 1: two kills at 2000ms, feed order wins (Alpha)
        // Round 2: Delta kills Alpha
        assert_eq!(record(&bundle, "p-alpha").first_bloods, 1);
        assert_eq!(record(&bundle, "p-alpha").first_deaths, 1);
        assert_eq!(record(&bundle, "p-delta").first_bloods, 1);
        assert_eq!(record(&bundle, "p-delta").first_deaths, 1);
    }

    #[test]
    fn test_plants_and_defuses() {
        let bundle = normalize_match(&sample()).unwrap();
        assert_eq!(record(&bundle, "p-alpha").plants, 1);
        assert_eq!(record(&bundle, "p-bravo").plants, 1);
        assert_eq!(record(&bundle, "p-charlie").defuses, 1);
        assert_eq!(record(&bundle, "p-delta").plants, 0);
    }

    #[test]
    fn test_heuristic_clutch_detection() {
        let bundle = normalize_match(&sample()).unwrap();

        // Rounds 0 and 2: Alpha is Red's only fragger with 2 kills, Red wins
        assert_eq!(record(&bundle, "p-alpha").clutches, 2);
        assert_eq!(record(&bundle, "p-alpha").clutches_lost, 0);

        // Round 2: Delta is Blue's only fragger with 2 kills, Blue loses
        assert_eq!(record(&bundle, "p-delta").clutches, 0);
        assert_eq!(record(&bundle, "p-delta").clutches_lost, 1);

        // Round 1: Alpha had 3 kills but Bravo also fragged
        assert_eq!(record(&bundle, "p-bravo").clutches, 0);
    }

    #[test]
    fn test_top_and_bottom_frag_first_occurrence_wins_ties() {
        let bundle = normalize_match(&sample()).unwrap();

        assert!(record(&bundle, "p-alpha").top_frag);
        // Bravo and Delta both scored 300; Bravo is listed first
        assert!(record(&bundle, "p-bravo").bottom_frag);
        assert!(!record(&bundle, "p-delta").bottom_frag);

        let tops = bundle.entries.iter().filter(|e| e.record.top_frag).count();
        let bottoms = bundle.entries.iter().filter(|e| e.record.bottom_frag).count();
        assert_eq!(tops, 1);
        assert_eq!(bottoms, 1);
    }

    #[test]
    fn test_match_id_is_lowercased() {
        let mut raw = sample();
        raw.metadata.match_id = format!("  {}  ", MATCH_ID.to_uppercase());
        let bundle = normalize_match(&raw).unwrap();
        assert_eq!(bundle.game.id.as_str(), MATCH_ID);
        assert!(bundle.entries.iter().all(|e| e.record.match_id.as_str() == MATCH_ID));
    }

    #[test]
    fn test_non_uuid_match_id_is_schema_error() {
        for id in ["../../escaped", "m-1", "320b7150-9769-492a-a8ad-e31d95818838/.."] {
            let mut raw = sample();
            raw.metadata.match_id = id.to_string();
            assert_eq!(
                normalize_match(&raw),
                Err(SchemaError::InvalidMatchId(id.to_string()))
            );
        }

        let mut raw = sample();
        raw.metadata.match_id = "   ".to_string();
        assert_eq!(normalize_match(&raw), Err(SchemaError::MissingMatchId));
    }

    #[test]
    fn test_missing_teams_is_schema_error() {
        let mut raw = sample();
        raw.teams = None;
        assert_eq!(normalize_match(&raw), Err(SchemaError::MissingTeams));
    }

    #[test]
    fn test_missing_side_is_schema_error() {
        let mut raw = sample();
        raw.teams.as_mut().unwrap().retain(|t| t.team_id == "Red");
        assert_eq!(
            normalize_match(&raw),
            Err(SchemaError::MissingSide(Side::Blue))
        );
    }

    #[test]
    fn test_missing_stat_field_is_schema_error() {
        let mut raw = sample();
        raw.players[2].stats.as_mut().unwrap().kills = None;
        assert_eq!(
            normalize_match(&raw),
            Err(SchemaError::MissingField {
                puuid: "p-charlie".to_string(),
                field: "stats.kills",
            })
        );

        let mut raw = sample();
        raw.players[0].stats = None;
        assert!(matches!(
            normalize_match(&raw),
            Err(SchemaError::MissingField { field: "stats", .. })
        ));
    }

    #[test]
    fn test_invalid_outcome_is_schema_error() {
        let mut raw = sample();
        for team in raw.teams.as_mut().unwrap() {
            team.won = false;
        }
        assert_eq!(
            normalize_match(&raw),
            Err(SchemaError::InvalidOutcome {
                red_won: false,
                blue_won: false
            })
        );
    }

    #[test]
    fn test_unknown_team_and_duplicate_player() {
        let mut raw = sample();
        raw.players[0].team_id = "Green".to_string();
        assert!(matches!(
            normalize_match(&raw),
            Err(SchemaError::UnknownTeam { .. })
        ));

        let mut raw = sample();
        raw.players[1].puuid = raw.players[0].puuid.clone();
        assert!(matches!(
            normalize_match(&raw),
            Err(SchemaError::DuplicatePlayer { .. })
        ));
    }

    #[test]
    fn test_no_players_is_schema_error() {
        let mut raw = sample();
        raw.players.clear();
        assert_eq!(normalize_match(&raw), Err(SchemaError::NoPlayers));
    }

    #[test]
    fn test_zero_rounds_gives_zero_acs() {
        let mut raw = sample();
        for team in raw.teams.as_mut().unwrap() {
            team.rounds.won = 0;
            team.rounds.lost = 0;
        }
        let bundle = normalize_match(&raw).unwrap();
        assert_eq!(bundle.game.rounds, 0);
        assert!(bundle.entries.iter().all(|e| e.record.avg_combat_score == 0));
    }

    #[test]
    fn test_missing_event_lists_give_zero_counters() {
        let mut raw = sample();
        raw.kills = None;
        raw.rounds = None;
        let bundle = normalize_match(&raw).unwrap();
        let alpha = record(&bundle, "p-alpha");
        assert_eq!(alpha.first_bloods, 0);
        assert_eq!(alpha.plants, 0);
        assert_eq!(alpha.clutches, 0);
    }

    #[test]
    fn test_parse_raw_match_rejects_garbage() {
        assert!(matches!(
            parse_raw_match("{\"players\": []}"),
            Err(SchemaError::Malformed(_))
        ));
        assert!(parse_raw_match(&sample_match_json("m-9").to_string()).is_ok());
    }

    #[test]
    fn test_parse_raw_match_unwraps_envelope() {
        let envelope = serde_json::json!({ "status": 200, "data": sample_match_json("m-10") });
        let raw = parse_raw_match(&envelope.to_string()).unwrap();
        assert_eq!(raw.metadata.match_id, "m-10");
    }

    #[test]
    fn test_average_combat_score_rounding() {
        assert_eq!(average_combat_score(5000, 24), 208);
        assert_eq!(average_combat_score(250, 100), 3);
        assert_eq!(average_combat_score(300, 0), 0);
    }

    #[test]
    fn test_economy_rating() {
        assert_eq!(economy_rating(3000, 2000), 1.5);
        assert_eq!(economy_rating(1000, 3000), 0.33);
        assert_eq!(economy_rating(1000, 0), 0.0);
    }
}
