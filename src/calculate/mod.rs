//! Statistics calculation engine.
//!
//! Computes derived metrics from stored match rows:
//! - Career aggregates and per-agent / per-map breakdowns
//! - Population percentiles and badge awards
//! - Recency-weighted composite scores and tiers
//! - Snapshot-level reports for the API and CLI (`report`)
//!
//! Every function here is a pure function of its inputs. Degenerate inputs
//! (no matches, no deaths, zero variance) fall back to defined values instead
//! of failing.

pub mod aggregate;
pub mod badges;
pub mod percentile;
pub mod report;
pub mod tier;

pub use aggregate::*;
pub use badges::*;
pub use percentile::*;
pub use tier::*;

/// Round to a fixed number of decimals, halves away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Kill/death ratio; raw kills when there are no deaths.
pub fn kill_death_ratio(kills: u32, deaths: u32) -> f64 {
    if deaths > 0 {
        kills as f64 / deaths as f64
    } else {
        kills as f64
    }
}

/// `part / total` as a percentage; 0 when `total` is 0.
pub fn percentage(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Calculate win rate (percent) from wins and games.
pub fn calculate_win_rate(wins: u32, games: u32) -> f64 {
    percentage(wins, games)
}

/// Population mean; 0 for an empty population.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N); 0 for an empty population.
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
