//! Presentation outputs computed over a store snapshot.
//!
//! Each function reads one immutable [`Snapshot`] and returns a fresh value,
//! so the API and the CLI can call them concurrently without coordination.
//! Unknown players yield `None` or an empty list, never an error.

use tracing::debug;

use super::aggregate::{
    agent_breakdown, aggregate, aggregate_appearances, leaderboard as rank_players, map_breakdown,
};
use super::badges::{earned_badges, BadgeContext};
use super::percentile::Population;
use super::tier::{build_tier_list, TierInput, RECENT_WINDOW};
use crate::models::{
    BadgeInfo, GroupStats, LeaderboardEntry, MatchHistoryEntry, PlayerProfile, PlayerStats,
    Puuid, TierList,
};
use crate::storage::Snapshot;

/// Career statistics for every known player, in first-sighting order.
fn career_stats(snapshot: &Snapshot) -> Vec<PlayerStats> {
    snapshot
        .appearances_by_player()
        .iter()
        .map(|(_, history)| aggregate_appearances(history))
        .collect()
}

/// Career leaderboard over every player with at least one match.
pub fn leaderboard(snapshot: &Snapshot) -> Vec<LeaderboardEntry> {
    let rows = snapshot
        .appearances_by_player()
        .into_iter()
        .map(|(player, history)| (player, aggregate_appearances(&history)))
        .collect::<Vec<_>>();
    rank_players(rows)
}

/// Identity and career statistics for one player.
pub fn player_profile(snapshot: &Snapshot, puuid: &Puuid) -> Option<PlayerProfile> {
    let player = snapshot.player(puuid)?;
    let stats = aggregate_appearances(&snapshot.appearances(puuid));
    Some(PlayerProfile {
        player: player.clone(),
        stats,
    })
}

/// Badges one player has earned against the whole population.
pub fn player_badges(snapshot: &Snapshot, puuid: &Puuid) -> Vec<BadgeInfo> {
    if snapshot.player(puuid).is_none() {
        return Vec::new();
    }

    let stats = aggregate_appearances(&snapshot.appearances(puuid));
    let recent = aggregate(
        snapshot
            .recent_appearances(puuid, RECENT_WINDOW)
            .iter()
            .map(|a| a.record),
    );
    let everyone = career_stats(snapshot);
    let population = Population::from_stats(&everyone);

    let ctx = BadgeContext::build(&stats, &recent, &population);
    let badges = earned_badges(&ctx);
    debug!(%puuid, badges = badges.len(), "Evaluated player badges");
    badges
}

/// Per-agent breakdown for one player, most played first.
pub fn agent_stats(snapshot: &Snapshot, puuid: &Puuid) -> Vec<GroupStats> {
    agent_breakdown(&snapshot.appearances(puuid))
}

/// Per-map breakdown for one player, most played first.
pub fn map_stats(snapshot: &Snapshot, puuid: &Puuid) -> Vec<GroupStats> {
    map_breakdown(&snapshot.appearances(puuid))
}

/// One player's matches, newest first.
pub fn match_history(snapshot: &Snapshot, puuid: &Puuid) -> Vec<MatchHistoryEntry> {
    let mut history = snapshot.appearances(puuid);
    history.sort_by(|a, b| b.game.started_at.cmp(&a.game.started_at));
    history.into_iter().map(MatchHistoryEntry::from).collect()
}

/// Tier list over every player with at least one match.
pub fn tier_list(snapshot: &Snapshot) -> TierList {
    let inputs: Vec<TierInput<'_>> = snapshot
        .appearances_by_player()
        .into_iter()
        .map(|(player, history)| TierInput { player, history })
        .collect();
    build_tier_list(&inputs)
}
