//! Match store: the single write path and the read snapshots.
//!
//! Every ingested match is one line in `normalized/matches.jsonl` holding the
//! match, all of its player rows and the player identities seen in it. That
//! line is the unit of atomicity: a bundle is either fully on disk or, if the
//! write was torn, skipped on load.
//!
//! Readers take an `Arc<Snapshot>` and never block writers. Writers are
//! serialized by a mutex; each successful write publishes a new snapshot.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::models::{Appearance, Match, MatchBundle, MatchId, Player, PlayerMatch, Puuid};

/// One line of the match log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMatch {
    pub ingested_at: DateTime<Utc>,
    #[serde(flatten)]
    pub bundle: MatchBundle,
}

/// Immutable view of everything stored at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    matches: IndexMap<MatchId, Match>,
    /// First-sighting order; name and tag follow the latest sighting
    players: IndexMap<Puuid, Player>,
    records: Vec<PlayerMatch>,
    by_player: IndexMap<Puuid, Vec<usize>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored bundles in log order. Repeated match ids keep the
    /// first occurrence.
    pub fn from_bundles<'a, I>(bundles: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchBundle>,
    {
        let mut snapshot = Self::new();
        for bundle in bundles {
            if snapshot.contains_match(&bundle.game.id) {
                warn!(match_id = %bundle.game.id, "Skipping repeated match in log");
                continue;
            }
            snapshot.apply(bundle);
        }
        snapshot
    }

    fn apply(&mut self, bundle: &MatchBundle) {
        self.matches
            .insert(bundle.game.id.clone(), bundle.game.clone());

        for entry in &bundle.entries {
            let puuid = entry.player.puuid.clone();
            self.players.insert(puuid.clone(), entry.player.clone());
            self.by_player
                .entry(puuid)
                .or_default()
                .push(self.records.len());
            self.records.push(entry.record.clone());
        }
    }

    pub fn contains_match(&self, id: &MatchId) -> bool {
        self.matches.contains_key(id)
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn get_match(&self, id: &MatchId) -> Option<&Match> {
        self.matches.get(id)
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    pub fn player(&self, puuid: &Puuid) -> Option<&Player> {
        self.players.get(puuid)
    }

    /// All players, in first-sighting order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Every row of one match, in payload order.
    pub fn match_records(&self, id: &MatchId) -> Vec<&PlayerMatch> {
        self.records.iter().filter(|r| &r.match_id == id).collect()
    }

    /// All of a player's appearances, in ingestion order. Empty for an
    /// unknown player.
    pub fn appearances(&self, puuid: &Puuid) -> Vec<Appearance<'_>> {
        self.by_player
            .get(puuid)
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&i| {
                        let record = self.records.get(i)?;
                        let game = self.matches.get(&record.match_id)?;
                        Some(Appearance::new(record, game))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A player's `n` most recent appearances, newest first.
    pub fn recent_appearances(&self, puuid: &Puuid, n: usize) -> Vec<Appearance<'_>> {
        let mut appearances = self.appearances(puuid);
        appearances.sort_by(|a, b| b.game.started_at.cmp(&a.game.started_at));
        appearances.truncate(n);
        appearances
    }

    /// Every player with their appearances, in first-sighting order.
    pub fn appearances_by_player(&self) -> Vec<(&Player, Vec<Appearance<'_>>)> {
        self.players
            .values()
            .map(|p| (p, self.appearances(&p.puuid)))
            .collect()
    }
}

/// Durable match store.
pub struct MatchStore {
    config: StorageConfig,
    writer: JsonlWriter<StoredMatch>,
    snapshot: RwLock<Arc<Snapshot>>,
    write_lock: Mutex<()>,
}

impl MatchStore {
    /// Open the store, loading every readable line of the match log.
    pub fn open(config: StorageConfig) -> Result<Self, StorageError> {
        let path = config.matches_path();
        let stored: Vec<StoredMatch> = JsonlReader::new(path.clone()).read_all()?;
        let snapshot = Snapshot::from_bundles(stored.iter().map(|s| &s.bundle));

        info!(
            matches = snapshot.match_count(),
            players = snapshot.player_count(),
            "Loaded match store from {:?}",
            path
        );

        Ok(Self {
            writer: JsonlWriter::new(path),
            config,
            snapshot: RwLock::new(Arc::new(snapshot)),
            write_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Current read snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn contains_match(&self, id: &MatchId) -> bool {
        self.snapshot().contains_match(id)
    }

    /// Persist a normalized match with all of its player rows.
    ///
    /// Fails with [`StorageError::DuplicateMatch`] if the id is already
    /// stored; nothing is written in that case.
    pub fn insert(&self, bundle: MatchBundle) -> Result<StoredMatch, StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;

        let current = self.snapshot();
        if current.contains_match(&bundle.game.id) {
            return Err(StorageError::DuplicateMatch(bundle.game.id));
        }

        let stored = StoredMatch {
            ingested_at: Utc::now(),
            bundle,
        };
        self.writer.append(&stored)?;

        let mut next = (*current).clone();
        next.apply(&stored.bundle);
        self.publish(next)?;

        info!(
            match_id = %stored.bundle.game.id,
            players = stored.bundle.entries.len(),
            "Stored match"
        );
        Ok(stored)
    }

    /// Keep the provider payload for re-processing.
    pub fn archive_raw(&self, match_id: &MatchId, payload: &str) -> Result<PathBuf, StorageError> {
        let path = self.config.raw_match_path(match_id);
        fs::create_dir_all(self.config.raw_dir())?;
        fs::write(&path, payload)?;
        Ok(path)
    }

    /// Delete every stored match and archived payload. Returns how many
    /// matches were removed.
    pub fn reset(&self) -> Result<usize, StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;

        let removed = self.snapshot().match_count();

        let path = self.config.matches_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        let raw_dir = self.config.raw_dir();
        if raw_dir.exists() {
            fs::remove_dir_all(&raw_dir)?;
        }

        self.publish(Snapshot::new())?;
        warn!(removed, "Match store reset");
        Ok(removed)
    }

    fn publish(&self, snapshot: Snapshot) -> Result<(), StorageError> {
        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        *guard = Arc::new(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayerEntry;
    use crate::test_support::{game, record};
    use tempfile::TempDir;

    fn bundle(match_id: &str, day: i64, players: &[(&str, &str)]) -> MatchBundle {
        MatchBundle {
            game: game(match_id, "Ascent", day, 20),
            entries: players
                .iter()
                .map(|(puuid, name)| PlayerEntry {
                    player: Player::new(*puuid, *name, "NA1"),
                    record: PlayerMatch {
                        kills: 10,
                        ..record(puuid, match_id)
                    },
                })
                .collect(),
        }
    }

    fn open_store(temp_dir: &TempDir) -> MatchStore {
        MatchStore::open(StorageConfig::new(temp_dir.path().to_path_buf())).unwrap()
    }

    #[test]
    fn test_insert_and_query() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        store
            .insert(bundle("m1", 0, &[("a", "Alice"), ("b", "Bob")]))
            .unwrap();
        store.insert(bundle("m2", 1, &[("a", "Alice")])).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.match_count(), 2);
        assert_eq!(snapshot.player_count(), 2);
        assert_eq!(snapshot.appearances(&"a".into()).len(), 2);
        assert_eq!(snapshot.appearances(&"b".into()).len(), 1);
        assert!(snapshot.appearances(&"nobody".into()).is_empty());
        assert!(snapshot.player(&"nobody".into()).is_none());
        assert_eq!(snapshot.match_records(&"m1".into()).len(), 2);
    }

    #[test]
    fn test_duplicate_is_rejected_without_write() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        store.insert(bundle("m1", 0, &[("a", "Alice")])).unwrap();
        let err = store
            .insert(bundle("m1", 0, &[("a", "Alice"), ("b", "Bob")]))
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateMatch(ref id) if id.as_str() == "m1"));

        let content = std::fs::read_to_string(store.config().matches_path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert_eq!(store.snapshot().player_count(), 1);
    }

    #[test]
    fn test_reopen_restores_state() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = open_store(&temp_dir);
            store.insert(bundle("m1", 0, &[("a", "Alice")])).unwrap();
            store.insert(bundle("m2", 1, &[("a", "Ally"), ("b", "Bob")])).unwrap();
        }

        let store = open_store(&temp_dir);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.match_count(), 2);
        assert!(store.contains_match(&"m2".into()));

        // name follows the latest sighting, order follows the first
        let names: Vec<&str> = snapshot.players().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ally", "Bob"]);
    }

    #[test]
    fn test_torn_line_is_skipped_on_load() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = open_store(&temp_dir);
            store.insert(bundle("m1", 0, &[("a", "Alice")])).unwrap();
        }
        let path = StorageConfig::new(temp_dir.path().to_path_buf()).matches_path();
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("{\"ingested_at\":\"2025-06-02T00:00:00Z\",\"game\":{\"id\":\"m2\"");
        std::fs::write(&path, content).unwrap();

        let store = open_store(&temp_dir);
        assert_eq!(store.snapshot().match_count(), 1);
        assert!(!store.contains_match(&"m2".into()));

        store.insert(bundle("m2", 1, &[("b", "Bob")])).unwrap();
        let store = open_store(&temp_dir);
        assert_eq!(store.snapshot().match_count(), 2);
    }

    #[test]
    fn test_recent_appearances_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);
        for (id, day) in [("m1", 3), ("m2", 0), ("m3", 5), ("m4", 1)] {
            store.insert(bundle(id, day, &[("a", "Alice")])).unwrap();
        }

        let snapshot = store.snapshot();
        let recent = snapshot.recent_appearances(&"a".into(), 3);
        let ids: Vec<&str> = recent.iter().map(|a| a.game.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m1", "m4"]);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);
        store.insert(bundle("m1", 0, &[("a", "Alice")])).unwrap();

        let before = store.snapshot();
        store.insert(bundle("m2", 1, &[("a", "Alice")])).unwrap();

        assert_eq!(before.match_count(), 1);
        assert_eq!(store.snapshot().match_count(), 2);
    }

    #[test]
    fn test_appearances_by_player() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);
        store
            .insert(bundle("m1", 0, &[("b", "Bob"), ("a", "Alice")]))
            .unwrap();
        store.insert(bundle("m2", 1, &[("a", "Alice")])).unwrap();

        let snapshot = store.snapshot();
        let grouped = snapshot.appearances_by_player();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0.name, "Bob");
        assert_eq!(grouped[1].1.len(), 2);
    }

    #[test]
    fn test_archive_and_reset() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);
        store.insert(bundle("m1", 0, &[("a", "Alice")])).unwrap();
        let raw_path = store.archive_raw(&"m1".into(), "{\"status\":200}").unwrap();
        assert!(raw_path.exists());

        assert_eq!(store.reset().unwrap(), 1);
        assert_eq!(store.snapshot().match_count(), 0);
        assert!(!raw_path.exists());

        let store = open_store(&temp_dir);
        assert_eq!(store.snapshot().match_count(), 0);
        store.insert(bundle("m1", 0, &[("a", "Alice")])).unwrap();
    }

    #[test]
    fn test_repeated_log_entries_keep_first() {
        let first = bundle("m1", 0, &[("a", "Alice")]);
        let second = bundle("m1", 0, &[("b", "Bob")]);
        let snapshot = Snapshot::from_bundles([&first, &second]);
        assert_eq!(snapshot.match_count(), 1);
        assert_eq!(snapshot.player_count(), 1);
    }
}
