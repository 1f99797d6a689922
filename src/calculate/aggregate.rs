//! Career aggregation.
//!
//! Folds any set of [`PlayerMatch`] rows into totals and rate statistics.
//! Sums are kept in integers (economy ratings as hundredths) so the result
//! does not depend on the order rows are folded in.

use std::hash::Hash;

use indexmap::IndexMap;

use super::{kill_death_ratio, percentage, round_to};
use crate::models::{Appearance, GroupStats, LeaderboardEntry, Player, PlayerMatch, PlayerStats};

/// Running totals over a set of match rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsAccumulator {
    pub games: u32,
    pub wins: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub damage: u64,
    pub headshots: u64,
    pub bodyshots: u64,
    pub legshots: u64,
    pub acs_sum: u64,
    pub first_bloods: u32,
    pub first_deaths: u32,
    pub plants: u32,
    pub defuses: u32,
    pub clutches: u32,
    pub clutches_lost: u32,
    /// Sum of per-match economy ratings, in hundredths
    pub econ_hundredths: i64,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one match row into the totals.
    pub fn add(&mut self, r: &PlayerMatch) {
        self.games += 1;
        if r.won {
            self.wins += 1;
        }
        self.kills += r.kills;
        self.deaths += r.deaths;
        self.assists += r.assists;
        self.damage += u64::from(r.damage);
        self.headshots += u64::from(r.headshots);
        self.bodyshots += u64::from(r.bodyshots);
        self.legshots += u64::from(r.legshots);
        self.acs_sum += u64::from(r.avg_combat_score);
        self.first_bloods += r.first_bloods;
        self.first_deaths += r.first_deaths;
        self.plants += r.plants;
        self.defuses += r.defuses;
        self.clutches += r.clutches;
        self.clutches_lost += r.clutches_lost;
        self.econ_hundredths += (r.econ_rating * 100.0).round() as i64;
    }

    fn per_game(&self, total: f64) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            total / self.games as f64
        }
    }

    fn shot_percent(&self, part: u64) -> f64 {
        let total = self.headshots + self.bodyshots + self.legshots;
        if total == 0 {
            0.0
        } else {
            part as f64 / total as f64 * 100.0
        }
    }

    /// Produce the rounded statistics object.
    pub fn finish(&self) -> PlayerStats {
        let attempts = self.clutches + self.clutches_lost;

        PlayerStats {
            total_games: self.games,
            wins: self.wins,
            losses: self.games - self.wins,
            win_rate: round_to(percentage(self.wins, self.games), 1),
            kills: self.kills,
            deaths: self.deaths,
            assists: self.assists,
            kd: round_to(kill_death_ratio(self.kills, self.deaths), 2),
            avg_acs: self.per_game(self.acs_sum as f64).round() as u32,
            avg_damage: self.per_game(self.damage as f64).round() as u32,
            headshot_percent: round_to(self.shot_percent(self.headshots), 1),
            leg_shot_percent: round_to(self.shot_percent(self.legshots), 1),
            first_bloods: self.first_bloods,
            first_deaths: self.first_deaths,
            first_blood_share: round_to(percentage(self.first_bloods, self.games), 1),
            plants: self.plants,
            defuses: self.defuses,
            clutches: self.clutches,
            clutches_lost: self.clutches_lost,
            clutch_win_rate: round_to(percentage(self.clutches, attempts), 1),
            economy_rating: round_to(self.per_game(self.econ_hundredths as f64) / 100.0, 2),
        }
    }

    /// Breakdown row for one group.
    pub fn group_row(&self, name: String) -> GroupStats {
        GroupStats {
            name,
            games: self.games,
            wins: self.wins,
            win_rate: round_to(percentage(self.wins, self.games), 1),
            kd: round_to(kill_death_ratio(self.kills, self.deaths), 2),
            avg_acs: self.per_game(self.acs_sum as f64).round() as u32,
        }
    }
}

/// Aggregate a set of match rows. Empty input yields all-zero stats.
pub fn aggregate<'a, I>(records: I) -> PlayerStats
where
    I: IntoIterator<Item = &'a PlayerMatch>,
{
    let mut acc = StatsAccumulator::new();
    for r in records {
        acc.add(r);
    }
    acc.finish()
}

/// Aggregate a player's appearances.
pub fn aggregate_appearances(appearances: &[Appearance<'_>]) -> PlayerStats {
    aggregate(appearances.iter().map(|a| a.record))
}

/// Fold appearances into one accumulator per key.
///
/// Keys keep the order in which they were first encountered.
pub fn group_fold<'a, K, A, KF, FF>(appearances: &[Appearance<'a>], key: KF, fold: FF) -> IndexMap<K, A>
where
    K: Hash + Eq,
    A: Default,
    KF: Fn(&Appearance<'a>) -> K,
    FF: Fn(&mut A, &Appearance<'a>),
{
    let mut groups: IndexMap<K, A> = IndexMap::new();
    for a in appearances {
        fold(groups.entry(key(a)).or_default(), a);
    }
    groups
}

/// Breakdown by an arbitrary key, most played first. Equal game counts keep
/// first-encountered order.
pub fn breakdown_by<'a, F>(appearances: &[Appearance<'a>], key: F) -> Vec<GroupStats>
where
    F: Fn(&Appearance<'a>) -> String,
{
    let groups = group_fold(appearances, key, |acc: &mut StatsAccumulator, a| {
        acc.add(a.record)
    });

    let mut rows: Vec<GroupStats> = groups
        .into_iter()
        .map(|(name, acc)| acc.group_row(name))
        .collect();
    rows.sort_by(|a, b| b.games.cmp(&a.games));
    rows
}

/// Per-agent breakdown.
pub fn agent_breakdown(appearances: &[Appearance<'_>]) -> Vec<GroupStats> {
    breakdown_by(appearances, |a| a.record.agent.clone())
}

/// Per-map breakdown.
pub fn map_breakdown(appearances: &[Appearance<'_>]) -> Vec<GroupStats> {
    breakdown_by(appearances, |a| a.game.map.clone())
}

/// Career leaderboard: win rate descending, then average ACS descending.
///
/// Players without games are left out. Remaining ties keep input order.
pub fn leaderboard<'a, I>(rows: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = (&'a Player, PlayerStats)>,
{
    let mut entries: Vec<LeaderboardEntry> = rows
        .into_iter()
        .filter(|(_, s)| s.total_games > 0)
        .map(|(p, s)| LeaderboardEntry {
            rank: 0,
            puuid: p.puuid.clone(),
            name: p.name.clone(),
            tag: p.tag.clone(),
            games: s.total_games,
            wins: s.wins,
            losses: s.losses,
            win_rate: s.win_rate,
            kills: s.kills,
            deaths: s.deaths,
            assists: s.assists,
            kd: s.kd,
            avg_acs: s.avg_acs,
            headshot_percent: s.headshot_percent,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then_with(|| b.avg_acs.cmp(&a.avg_acs))
    });

    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }

    entries
}
