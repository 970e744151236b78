//! CRUD repository over the goal entry collection.
//!
//! The whole collection lives in one slot as a JSON array. Every mutation
//! reads it, changes it, and writes it back in a single `set`, so the store
//! assumes exactly one writer at a time.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};
use ulid::Ulid;

use crate::storage::{KeyValueStore, StorageError};
use crate::types::{EntryDraft, EntryPatch, GoalEntry};

pub const ENTRIES_KEY: &str = "goal_entries";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Persistence unavailable for '{key}': {source}")]
    PersistenceUnavailable {
        key: String,
        #[source]
        source: StorageError,
    },
}

pub struct EntryStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> EntryStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, ENTRIES_KEY)
    }

    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// All entries, newest first.
    ///
    /// Never fails: a missing, unreadable or corrupt slot reads as empty.
    pub fn list(&self) -> Vec<GoalEntry> {
        let mut entries = self.load();
        // stable, so equal timestamps keep their stored order
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }

    pub fn get(&self, id: &str) -> Option<GoalEntry> {
        self.load().into_iter().find(|e| e.id == id)
    }

    pub fn create(&self, draft: EntryDraft) -> Result<GoalEntry, StoreError> {
        let mut entries = self.list();
        let id = fresh_id(&entries);
        let entry = GoalEntry::from_draft(draft, id, Utc::now());

        entries.insert(0, entry.clone());
        self.persist(&entries)?;
        debug!(id = %entry.id, ninja = %entry.ninja_name, "entry created");
        Ok(entry)
    }

    /// Merge `patch` into the entry with `id`. Returns `None` without writing
    /// when no such entry exists.
    pub fn update(&self, id: &str, patch: &EntryPatch) -> Result<Option<GoalEntry>, StoreError> {
        let mut entries = self.list();
        let Some(entry) = entries.iter_mut().find(|e| e.id == id) else {
            debug!(id, "update skipped, entry not found");
            return Ok(None);
        };

        patch.apply_to(entry);
        let updated = entry.clone();
        self.persist(&entries)?;
        debug!(id, "entry updated");
        Ok(Some(updated))
    }

    /// Add `delta` to the entry's koin counter.
    pub fn adjust_koin(&self, id: &str, delta: i64) -> Result<Option<GoalEntry>, StoreError> {
        let Some(current) = self.get(id) else {
            return Ok(None);
        };
        self.update(id, &EntryPatch::koin(current.koin.saturating_add(delta)))
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut entries = self.list();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            debug!(id, "delete skipped, entry not found");
            return Ok(());
        }
        self.persist(&entries)?;
        debug!(id, "entry deleted");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend
            .remove(&self.key)
            .map_err(|source| self.unavailable(source))?;
        debug!(key = %self.key, "all entries cleared");
        Ok(())
    }

    fn load(&self) -> Vec<GoalEntry> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read goal entries");
                return Vec::new();
            }
        };
        let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to parse goal entries");
                return Vec::new();
            }
        };
        // one malformed record must not take the rest of the collection with it
        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(key = %self.key, index, error = %e, "skipping unreadable goal entry");
                    None
                }
            })
            .collect()
    }

    fn persist(&self, entries: &[GoalEntry]) -> Result<(), StoreError> {
        let payload = serde_json::to_string(entries)
            .map_err(|e| self.unavailable(StorageError::Json(e)))?;
        self.backend
            .set(&self.key, &payload)
            .map_err(|source| self.unavailable(source))
    }

    fn unavailable(&self, source: StorageError) -> StoreError {
        StoreError::PersistenceUnavailable {
            key: self.key.clone(),
            source,
        }
    }
}

fn fresh_id(existing: &[GoalEntry]) -> String {
    loop {
        let id = Ulid::new().to_string();
        if !existing.iter().any(|e| e.id == id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn draft(ninja: &str) -> EntryDraft {
        EntryDraft {
            date: "2025-01-10".to_string(),
            sensei_name: "Joshua".to_string(),
            ninja_name: ninja.to_string(),
            current_project: "Orange Belt: Level 1 | Hello World!".to_string(),
            description: "Worked on sprites".to_string(),
            goal1: "Half of build Orange lvl1 Bouncing on the Walls".to_string(),
            goal2: "Complete build Orange lvl1 Bouncing on the Walls".to_string(),
            koin: 0,
        }
    }

    #[test]
    fn list_on_empty_store_is_empty() {
        let store = EntryStore::new(MemoryStore::new());
        assert!(store.list().is_empty());
    }

    #[test]
    fn create_assigns_id_and_timestamp() {
        let store = EntryStore::new(MemoryStore::new());
        let before = Utc::now();
        let entry = store.create(draft("Logan")).unwrap();

        assert!(!entry.id.is_empty());
        assert!(entry.created_at >= before);
        assert_eq!(store.get(&entry.id), Some(entry));
    }

    #[test]
    fn consecutive_creates_never_collide() {
        let store = EntryStore::new(MemoryStore::new());
        let ids: Vec<String> = (0..50)
            .map(|i| store.create(draft(&format!("ninja-{i}"))).unwrap().id)
            .collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn list_sorts_by_created_at_even_when_stored_out_of_order() {
        let backend = MemoryStore::new();
        backend.seed(
            ENTRIES_KEY,
            r#"[
              {"id":"a","date":"d","senseiName":"s","ninjaName":"old","currentProject":"p",
               "description":"x","goal1":"","goal2":"","createdAt":"2024-01-01T00:00:00Z"},
              {"id":"b","date":"d","senseiName":"s","ninjaName":"new","currentProject":"p",
               "description":"x","goal1":"","goal2":"","createdAt":"2025-01-01T00:00:00Z"}
            ]"#,
        );
        let store = EntryStore::new(&backend);
        let names: Vec<_> = store.list().into_iter().map(|e| e.ninja_name).collect();
        assert_eq!(names, ["new", "old"]);
    }

    #[test]
    fn equal_timestamps_keep_stored_order() {
        let backend = MemoryStore::new();
        backend.seed(
            ENTRIES_KEY,
            r#"[
              {"id":"a","date":"d","senseiName":"s","ninjaName":"first","currentProject":"p",
               "description":"x","goal1":"","goal2":"","createdAt":"2025-01-01T00:00:00Z"},
              {"id":"b","date":"d","senseiName":"s","ninjaName":"second","currentProject":"p",
               "description":"x","goal1":"","goal2":"","createdAt":"2025-01-01T00:00:00Z"},
              {"id":"c","date":"d","senseiName":"s","ninjaName":"newer","currentProject":"p",
               "description":"x","goal1":"","goal2":"","createdAt":"2025-02-01T00:00:00Z"}
            ]"#,
        );
        let store = EntryStore::new(&backend);
        for _ in 0..3 {
            let names: Vec<_> = store.list().into_iter().map(|e| e.ninja_name).collect();
            assert_eq!(names, ["newer", "first", "second"]);
        }
    }

    #[test]
    fn records_without_timestamp_survive_a_write() {
        let backend = MemoryStore::new();
        backend.seed(
            ENTRIES_KEY,
            r#"[
              {"id":"a","date":"d","senseiName":"s","ninjaName":"Logan","currentProject":"p",
               "description":"x","goal1":"","goal2":"","createdAt":"2025-01-10T00:00:00.000Z"},
              {"id":"b","date":"d","senseiName":"s","ninjaName":"Maya","currentProject":"p",
               "description":"x","goal1":"","goal2":"","createdAt":null}
            ]"#,
        );
        let store = EntryStore::new(&backend);
        assert_eq!(store.list().len(), 2);

        store.create(draft("Kai")).unwrap();

        let names: Vec<_> = store.list().into_iter().map(|e| e.ninja_name).collect();
        assert_eq!(names, ["Kai", "Logan", "Maya"]);
        let stored = backend.get(ENTRIES_KEY).unwrap().unwrap();
        assert!(stored.contains("Logan") && stored.contains("Maya"));
    }

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let backend = MemoryStore::new();
        backend.seed(
            ENTRIES_KEY,
            r#"[
              {"id":"a","date":"d","senseiName":"s","ninjaName":"Logan","currentProject":"p",
               "description":"x","goal1":"","goal2":"","createdAt":"2025-01-10T00:00:00Z"},
              {"id":42,"ninjaName":"broken"}
            ]"#,
        );
        let store = EntryStore::new(&backend);
        let names: Vec<_> = store.list().into_iter().map(|e| e.ninja_name).collect();
        assert_eq!(names, ["Logan"]);
    }

    #[test]
    fn corrupt_payload_reads_as_empty() {
        let backend = MemoryStore::new();
        backend.seed(ENTRIES_KEY, "{not json");
        let store = EntryStore::new(&backend);
        assert!(store.list().is_empty());
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn update_missing_id_is_a_no_op() {
        let backend = MemoryStore::new();
        let store = EntryStore::new(&backend);
        store.create(draft("Logan")).unwrap();
        let snapshot = backend.get(ENTRIES_KEY).unwrap();

        let result = store.update("missing", &EntryPatch::koin(5)).unwrap();
        assert_eq!(result, None);
        assert_eq!(backend.get(ENTRIES_KEY).unwrap(), snapshot);
    }

    #[test]
    fn update_keeps_created_at() {
        let store = EntryStore::new(MemoryStore::new());
        let entry = store.create(draft("Logan")).unwrap();
        let patch = EntryPatch {
            description: Some("Moved on to the next build".to_string()),
            ..EntryPatch::default()
        };

        let updated = store.update(&entry.id, &patch).unwrap().unwrap();
        assert_eq!(updated.description, "Moved on to the next build");
        assert_eq!(updated.created_at, entry.created_at);
        assert_eq!(updated.ninja_name, entry.ninja_name);
    }

    #[test]
    fn adjust_koin_accumulates() {
        let store = EntryStore::new(MemoryStore::new());
        let entry = store.create(draft("Maya")).unwrap();

        store.adjust_koin(&entry.id, 1).unwrap();
        store.adjust_koin(&entry.id, 1).unwrap();
        assert_eq!(store.get(&entry.id).unwrap().koin, 2);

        store.adjust_koin(&entry.id, -5).unwrap();
        assert_eq!(store.get(&entry.id).unwrap().koin, -3);
        assert_eq!(store.adjust_koin("missing", 1).unwrap(), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = EntryStore::new(MemoryStore::new());
        let a = store.create(draft("Logan")).unwrap();
        let b = store.create(draft("Maya")).unwrap();

        store.delete(&a.id).unwrap();
        store.delete(&a.id).unwrap();
        store.delete("never-existed").unwrap();

        let ids: Vec<_> = store.list().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, [b.id]);
    }

    #[test]
    fn clear_removes_the_slot() {
        let backend = MemoryStore::new();
        let store = EntryStore::new(&backend);
        store.create(draft("Logan")).unwrap();

        store.clear().unwrap();
        assert!(store.list().is_empty());
        assert_eq!(backend.get(ENTRIES_KEY).unwrap(), None);
    }

    #[test]
    fn write_failure_surfaces_as_persistence_unavailable() {
        let backend = MemoryStore::new();
        let store = EntryStore::new(&backend);
        let entry = store.create(draft("Logan")).unwrap();
        backend.fail_writes(true);

        let err = store.create(draft("Maya")).unwrap_err();
        assert!(matches!(err, StoreError::PersistenceUnavailable { ref key, .. } if key == ENTRIES_KEY));
        assert!(store.update(&entry.id, &EntryPatch::koin(1)).is_err());
        assert!(store.delete(&entry.id).is_err());
        assert!(store.clear().is_err());

        // nothing was lost or half-written
        assert_eq!(store.list(), vec![entry]);
    }
}
