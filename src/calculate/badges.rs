//! Badge catalog and evaluation.
//!
//! The catalog is a fixed table. Each entry pairs display metadata with a
//! plain function pointer over a fully populated [`BadgeContext`], so
//! evaluation has no hidden inputs and the same context always earns the
//! same badges.

use tracing::debug;

use super::percentile::Population;
use crate::models::{BadgeCategory, BadgeInfo, PlayerStats};

/// Everything a badge predicate may look at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BadgeContext {
    pub total_games: u32,
    pub kd: f64,
    pub headshot_percent: f64,
    pub leg_shot_percent: f64,
    pub clutches: u32,
    pub clutch_win_rate: f64,
    pub economy_rating: f64,
    pub first_blood_share: f64,
    pub plants: u32,
    pub defuses: u32,
    pub avg_acs: u32,

    /// Games in the recent window (at most 3)
    pub recent_games: u32,
    pub recent_first_bloods_per_game: f64,

    pub kd_percentile: f64,
    pub win_rate_percentile: f64,
    pub acs_percentile: f64,

    pub is_bottom_frag: bool,
    pub is_bottomest_frag: bool,
    pub has_most_clutches: bool,
}

impl BadgeContext {
    /// Build the context for one player.
    ///
    /// `recent` is the aggregate of the player's most recent matches.
    /// Population-relative fields stay false/zero for a player with no games.
    pub fn build(stats: &PlayerStats, recent: &PlayerStats, population: &Population) -> Self {
        let active = stats.total_games > 0 && !population.is_empty();
        let pct = if active {
            population.percentiles(stats)
        } else {
            Default::default()
        };

        let recent_first_bloods_per_game = if recent.total_games > 0 {
            recent.first_bloods as f64 / recent.total_games as f64
        } else {
            0.0
        };

        Self {
            total_games: stats.total_games,
            kd: stats.kd,
            headshot_percent: stats.headshot_percent,
            leg_shot_percent: stats.leg_shot_percent,
            clutches: stats.clutches,
            clutch_win_rate: stats.clutch_win_rate,
            economy_rating: stats.economy_rating,
            first_blood_share: stats.first_blood_share,
            plants: stats.plants,
            defuses: stats.defuses,
            avg_acs: stats.avg_acs,
            recent_games: recent.total_games,
            recent_first_bloods_per_game,
            kd_percentile: pct.kd,
            win_rate_percentile: pct.win_rate,
            acs_percentile: pct.acs,
            is_bottom_frag: active && pct.acs <= 10.0,
            is_bottomest_frag: active && population.min_acs() == Some(stats.avg_acs),
            has_most_clutches: active
                && stats.clutches > 0
                && stats.clutches == population.max_clutches,
        }
    }
}

pub type BadgePredicate = fn(&BadgeContext) -> bool;

/// One catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: BadgeCategory,
    predicate: BadgePredicate,
}

impl BadgeDefinition {
    pub fn is_earned(&self, ctx: &BadgeContext) -> bool {
        (self.predicate)(ctx)
    }

    pub fn info(&self) -> BadgeInfo {
        BadgeInfo {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            category: self.category,
        }
    }
}

fn in_middle_band(percentile: f64) -> bool {
    (40.0..=60.0).contains(&percentile)
}

/// The badge catalog, in award order.
pub static BADGES: [BadgeDefinition; 13] = [
    BadgeDefinition {
        id: "raid-boss",
        name: "Raid Boss",
        description: "KD ≥ 1.5",
        category: BadgeCategory::Achievement,
        predicate: |c| c.kd >= 1.5,
    },
    BadgeDefinition {
        id: "sharpshooter",
        name: "Sharpshooter",
        description: "Headshot % ≥ 25%",
        category: BadgeCategory::Achievement,
        predicate: |c| c.headshot_percent >= 25.0,
    },
    BadgeDefinition {
        id: "clutch-king",
        name: "Clutch King",
        description: "≥5 clutches & clutch win % ≥ 60%",
        category: BadgeCategory::Achievement,
        predicate: |c| c.clutches >= 5 && c.clutch_win_rate >= 60.0,
    },
    BadgeDefinition {
        id: "eco-warrior",
        name: "Eco Warrior",
        description: "Damage per credit ≥ 1.25",
        category: BadgeCategory::Achievement,
        predicate: |c| c.economy_rating >= 1.25,
    },
    BadgeDefinition {
        id: "entry-fragger",
        name: "Entry Fragger",
        description: "First blood share ≥ 30%",
        category: BadgeCategory::Achievement,
        predicate: |c| c.first_blood_share >= 30.0,
    },
    BadgeDefinition {
        id: "first-strike",
        name: "First Strike",
        description: "Average 4+ first bloods per game over the last 3 games",
        category: BadgeCategory::Achievement,
        predicate: |c| c.recent_games > 0 && c.recent_first_bloods_per_game >= 4.0,
    },
    BadgeDefinition {
        id: "spike-whisperer",
        name: "Spike Whisperer",
        description: "Average 5+ plants/defuses per game",
        category: BadgeCategory::Achievement,
        predicate: |c| {
            c.total_games > 0 && (c.plants + c.defuses) as f64 / c.total_games as f64 >= 5.0
        },
    },
    BadgeDefinition {
        id: "cold-blooded",
        name: "Cold Blooded",
        description: "Most clutches overall",
        category: BadgeCategory::Achievement,
        predicate: |c| c.has_most_clutches,
    },
    BadgeDefinition {
        id: "toe-shooter",
        name: "Toe Shooter",
        description: "Leg shot % ≥ 15%",
        category: BadgeCategory::Derisive,
        predicate: |c| c.leg_shot_percent >= 15.0,
    },
    BadgeDefinition {
        id: "bottom-frag",
        name: "Bottom Frag",
        description: "Bottom 10% ACS",
        category: BadgeCategory::Derisive,
        predicate: |c| c.is_bottom_frag,
    },
    BadgeDefinition {
        id: "bottomest-frag",
        name: "Bottomest Frag",
        description: "Worst ACS out of everyone",
        category: BadgeCategory::Derisive,
        predicate: |c| c.is_bottomest_frag,
    },
    BadgeDefinition {
        id: "perfectly-average",
        name: "Perfectly Average",
        description: "KD, win rate and ACS all between the 40th and 60th percentile",
        category: BadgeCategory::Derisive,
        predicate: |c| {
            c.total_games > 0
                && in_middle_band(c.kd_percentile)
                && in_middle_band(c.win_rate_percentile)
                && in_middle_band(c.acs_percentile)
        },
    },
    BadgeDefinition {
        id: "carried",
        name: "Carried",
        description: "Top half win rate with bottom 20% KD and ACS",
        category: BadgeCategory::Derisive,
        predicate: |c| {
            c.total_games > 0
                && c.win_rate_percentile > 50.0
                && c.kd_percentile <= 20.0
                && c.acs_percentile <= 20.0
        },
    },
];

/// Ids of every badge the context earns, in catalog order.
pub fn evaluate_badges(ctx: &BadgeContext) -> Vec<&'static str> {
    let earned: Vec<&'static str> = BADGES
        .iter()
        .filter(|b| b.is_earned(ctx))
        .map(|b| b.id)
        .collect();
    debug!(count = earned.len(), "Evaluated badges");
    earned
}

/// Display metadata for a badge id.
pub fn badge_info(id: &str) -> Option<BadgeInfo> {
    BADGES.iter().find(|b| b.id == id).map(BadgeDefinition::info)
}

/// Evaluate and resolve in one step.
pub fn earned_badges(ctx: &BadgeContext) -> Vec<BadgeInfo> {
    evaluate_badges(ctx).into_iter().filter_map(badge_info).collect()
}
