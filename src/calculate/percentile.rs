//! Percentile ranks against the player population.

use crate::models::PlayerStats;

/// Percent of `population` at or below `value`; 0 for an empty population.
///
/// Tied values all share the highest rank of the tie.
pub fn percentile_rank(value: f64, population: &[f64]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let at_or_below = population.iter().filter(|v| **v <= value).count();
    at_or_below as f64 / population.len() as f64 * 100.0
}

/// One metric across the population, kept sorted for binary-search lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    sorted: Vec<f64>,
}

impl Distribution {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().collect();
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Same result as [`percentile_rank`], in O(log n).
    pub fn percentile(&self, value: f64) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        let at_or_below = self.sorted.partition_point(|v| *v <= value);
        at_or_below as f64 / self.sorted.len() as f64 * 100.0
    }

    pub fn min(&self) -> Option<f64> {
        self.sorted.first().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.sorted.last().copied()
    }
}

/// Percentiles of one player on the three ranked metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Percentiles {
    pub kd: f64,
    pub win_rate: f64,
    pub acs: f64,
}

/// Every player with at least one match, reduced to the metrics that
/// population-relative badges look at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    pub kd: Distribution,
    pub win_rate: Distribution,
    pub acs: Distribution,
    pub max_clutches: u32,
}

impl Population {
    /// Build from career stats. Players without games are skipped.
    pub fn from_stats<'a, I>(stats: I) -> Self
    where
        I: IntoIterator<Item = &'a PlayerStats>,
    {
        let active: Vec<&PlayerStats> = stats.into_iter().filter(|s| s.total_games > 0).collect();

        Self {
            kd: Distribution::new(active.iter().map(|s| s.kd)),
            win_rate: Distribution::new(active.iter().map(|s| s.win_rate)),
            acs: Distribution::new(active.iter().map(|s| s.avg_acs as f64)),
            max_clutches: active.iter().map(|s| s.clutches).max().unwrap_or(0),
        }
    }

    pub fn len(&self) -> usize {
        self.kd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kd.is_empty()
    }

    pub fn percentiles(&self, stats: &PlayerStats) -> Percentiles {
        Percentiles {
            kd: self.kd.percentile(stats.kd),
            win_rate: self.win_rate.percentile(stats.win_rate),
            acs: self.acs.percentile(stats.avg_acs as f64),
        }
    }

    /// Lowest average ACS in the population.
    pub fn min_acs(&self) -> Option<u32> {
        self.acs.min().map(|v| v as u32)
    }
}
