//! Core data models for the leaderboard.

mod badge;
mod ids;
mod match_record;
mod player;
mod stats;

pub use badge::*;
pub use ids::*;
pub use match_record::*;
pub use player::*;
pub use stats::*;
