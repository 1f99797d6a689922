//! Identifier types.
//!
//! Matches and players are keyed by the ids the match-data provider hands out
//! (a match UUID and a player `puuid`). Per-player match rows get a
//! deterministic id derived from both.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A string identifier, either provider-issued or derived from a content hash.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap an existing identifier.
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Generate an EntityId from input fields.
    /// Uses SHA256 and takes the first 16 characters for brevity.
    pub fn generate(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.as_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Provider match id (a UUID string).
pub type MatchId = EntityId;

/// Provider player id, stable across name/tag changes.
pub type Puuid = EntityId;

/// Derived id of one player's row in one match.
pub type PlayerMatchId = EntityId;

/// Deterministic id for a player's row in a match.
pub fn player_match_id(match_id: &MatchId, puuid: &Puuid) -> PlayerMatchId {
    EntityId::generate(&[match_id.as_str(), puuid.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation_deterministic() {
        let id1 = EntityId::generate(&["match-1", "puuid-1"]);
        let id2 = EntityId::generate(&["match-1", "puuid-1"]);
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_entity_id_different_inputs() {
        let id1 = EntityId::generate(&["match-1", "puuid-1"]);
        let id2 = EntityId::generate(&["match-1", "puuid-2"]);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_entity_id_length_and_hex() {
        let id = EntityId::generate(&["test", "input"]);
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_entity_id_serializes_as_plain_string() {
        let id = EntityId::from("320b7150-9769-492a-a8ad-e31d95818838");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"320b7150-9769-492a-a8ad-e31d95818838\"");

        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_entity_id_display_and_debug() {
        let id = EntityId::new("abc123".to_string());
        assert_eq!(format!("{}", id), "abc123");
        assert!(format!("{:?}", id).contains("abc123"));
    }

    #[test]
    fn test_player_match_id_is_order_sensitive() {
        let m: MatchId = "m".into();
        let p: Puuid = "p".into();
        assert_eq!(player_match_id(&m, &p), player_match_id(&m, &p));
        assert_ne!(
            player_match_id(&m, &p),
            EntityId::generate(&[p.as_str(), m.as_str()])
        );
    }
}
