//! Tier scoring.
//!
//! Each player is reduced to a snapshot of their most recent matches. The
//! four snapshot metrics are standardized against the population and
//! combined into one composite score, which maps to a tier.

use tracing::debug;

use super::aggregate::group_fold;
use super::{kill_death_ratio, mean, percentage, round_to, std_dev};
use crate::models::{Appearance, Player, Tier, TierList, TierListEntry};

/// Matches per player that feed the tier score.
pub const RECENT_WINDOW: usize = 3;

pub const KD_WEIGHT: f64 = 0.45;
pub const ADR_WEIGHT: f64 = 0.25;
pub const ACS_WEIGHT: f64 = 0.20;
pub const WIN_RATE_WEIGHT: f64 = 0.10;

/// Recent-window metrics for one player, full precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentSnapshot {
    pub kd: f64,
    pub adr: f64,
    pub acs: f64,
    pub win_rate: f64,
    pub games: u32,
}

/// The most recent `RECENT_WINDOW` appearances, newest first.
pub fn recent_window<'a>(history: &[Appearance<'a>]) -> Vec<Appearance<'a>> {
    let mut window = history.to_vec();
    window.sort_by(|a, b| b.game.started_at.cmp(&a.game.started_at));
    window.truncate(RECENT_WINDOW);
    window
}

/// Snapshot over a window of appearances; `None` for an empty window.
pub fn recent_snapshot(window: &[Appearance<'_>]) -> Option<RecentSnapshot> {
    if window.is_empty() {
        return None;
    }

    let games = window.len() as u32;
    let kills: u32 = window.iter().map(|a| a.record.kills).sum();
    let deaths: u32 = window.iter().map(|a| a.record.deaths).sum();
    let damage: u64 = window.iter().map(|a| u64::from(a.record.damage)).sum();
    let rounds: u64 = window.iter().map(|a| u64::from(a.game.rounds)).sum();
    let acs: u64 = window.iter().map(|a| u64::from(a.record.avg_combat_score)).sum();
    let wins = window.iter().filter(|a| a.record.won).count() as u32;

    Some(RecentSnapshot {
        kd: kill_death_ratio(kills, deaths),
        adr: if rounds > 0 {
            damage as f64 / rounds as f64
        } else {
            0.0
        },
        acs: acs as f64 / games as f64,
        win_rate: percentage(wins, games),
        games,
    })
}

#[derive(Default)]
struct AgentTally {
    games: u32,
    wins: u32,
    kd_sum: f64,
    acs_sum: u64,
}

impl AgentTally {
    fn score(&self) -> f64 {
        let games = self.games as f64;
        games * 10.0
            + (self.kd_sum / games) * 3.0
            + (self.acs_sum as f64 / games) * 0.01
            + percentage(self.wins, self.games) * 0.1
    }
}

/// Best agent over the full history.
///
/// Score per agent is `games*10 + avg_kd*3 + avg_acs*0.01 + win_rate*0.1`,
/// with K/D averaged per match. Equal scores keep the agent seen first.
pub fn best_agent(history: &[Appearance<'_>]) -> Option<String> {
    let tallies = group_fold(
        history,
        |a| a.record.agent.clone(),
        |t: &mut AgentTally, a| {
            t.games += 1;
            if a.record.won {
                t.wins += 1;
            }
            t.kd_sum += kill_death_ratio(a.record.kills, a.record.deaths);
            t.acs_sum += u64::from(a.record.avg_combat_score);
        },
    );

    let mut best: Option<(&str, f64)> = None;
    for (agent, tally) in &tallies {
        let score = tally.score();
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((agent.as_str(), score));
        }
    }
    best.map(|(agent, _)| agent.to_string())
}

/// Population mean and standard deviation of one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricSummary {
    pub mean: f64,
    pub std_dev: f64,
}

impl MetricSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let mean = mean(values);
        Self {
            mean,
            std_dev: std_dev(values, mean),
        }
    }

    /// Standard score; 0 when the population has no spread.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std_dev == 0.0 {
            0.0
        } else {
            (value - self.mean) / self.std_dev
        }
    }
}

/// Summaries of the four snapshot metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopulationSummary {
    pub kd: MetricSummary,
    pub adr: MetricSummary,
    pub acs: MetricSummary,
    pub win_rate: MetricSummary,
}

impl PopulationSummary {
    pub fn from_snapshots(snapshots: &[RecentSnapshot]) -> Self {
        let column = |f: fn(&RecentSnapshot) -> f64| -> Vec<f64> { snapshots.iter().map(f).collect() };
        Self {
            kd: MetricSummary::from_values(&column(|s| s.kd)),
            adr: MetricSummary::from_values(&column(|s| s.adr)),
            acs: MetricSummary::from_values(&column(|s| s.acs)),
            win_rate: MetricSummary::from_values(&column(|s| s.win_rate)),
        }
    }
}

/// Weighted sum of the standardized snapshot metrics, full precision.
pub fn composite_score(snapshot: &RecentSnapshot, population: &PopulationSummary) -> f64 {
    KD_WEIGHT * population.kd.z_score(snapshot.kd)
        + ADR_WEIGHT * population.adr.z_score(snapshot.adr)
        + ACS_WEIGHT * population.acs.z_score(snapshot.acs)
        + WIN_RATE_WEIGHT * population.win_rate.z_score(snapshot.win_rate)
}

/// One player's full match history, in any order.
#[derive(Debug, Clone)]
pub struct TierInput<'a> {
    pub player: &'a Player,
    pub history: Vec<Appearance<'a>>,
}

/// Score every player with at least one match and build the tier list,
/// best composite score first.
pub fn build_tier_list(inputs: &[TierInput<'_>]) -> TierList {
    let scored: Vec<(&TierInput<'_>, RecentSnapshot)> = inputs
        .iter()
        .filter_map(|input| recent_snapshot(&recent_window(&input.history)).map(|s| (input, s)))
        .collect();

    let snapshots: Vec<RecentSnapshot> = scored.iter().map(|(_, s)| *s).collect();
    let population = PopulationSummary::from_snapshots(&snapshots);

    let mut ranked: Vec<(f64, TierListEntry)> = scored
        .into_iter()
        .map(|(input, snapshot)| {
            let score = composite_score(&snapshot, &population);
            let entry = TierListEntry {
                puuid: input.player.puuid.clone(),
                name: input.player.name.clone(),
                tag: input.player.tag.clone(),
                tier: Tier::from_score(score),
                composite_score: round_to(score, 3),
                kd: round_to(snapshot.kd, 2),
                adr: snapshot.adr.round() as u32,
                acs: snapshot.acs.round() as u32,
                win_rate: round_to(snapshot.win_rate, 1),
                games_used: snapshot.games,
                best_agent: best_agent(&input.history),
            };
            (score, entry)
        })
        .collect();

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    debug!(players = ranked.len(), "Built tier list");
    TierList::from_sorted(ranked.into_iter().map(|(_, entry)| entry).collect())
}
