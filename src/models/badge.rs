//! Badge display metadata.

use serde::{Deserialize, Serialize};

/// Whether a badge is a compliment or a jab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    Achievement,
    Derisive,
}

/// Serializable description of an earned badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: BadgeCategory,
}
