//! Canonical match model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MatchId;

/// One of the two fixed team labels the provider uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Red,
    Blue,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Red, Side::Blue];

    /// Parse a provider team label ("Red" / "Blue").
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Red" => Some(Side::Red),
            "Blue" => Some(Side::Blue),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Side::Red => "Red",
            Side::Blue => "Blue",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A finished match. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Provider match id
    pub id: MatchId,

    /// Map name
    pub map: String,

    /// When the match started
    pub started_at: DateTime<Utc>,

    /// Rounds played (rounds won + lost of the red team)
    pub rounds: u32,

    pub red_won: bool,

    pub blue_won: bool,
}

impl Match {
    /// Whether the given side won this match.
    pub fn side_won(&self, side: Side) -> bool {
        match side {
            Side::Red => self.red_won,
            Side::Blue => self.blue_won,
        }
    }

    /// The winning side, if exactly one side won.
    pub fn winner(&self) -> Option<Side> {
        match (self.red_won, self.blue_won) {
            (true, false) => Some(Side::Red),
            (false, true) => Some(Side::Blue),
            _ => None,
        }
    }
}

/// A normalized match with every player's row: the unit of ingestion.
///
/// Either the whole bundle is stored or none of it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBundle {
    pub game: Match,
    pub entries: Vec<PlayerEntry>,
}

/// Player identity as seen in this match plus their match row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub player: super::Player,
    pub record: super::PlayerMatch,
}
