//! Portfolio library.
//!
//! The whole collection lives under one store key as a JSON array in
//! insertion order. Every mutation reads the full array, changes it in
//! memory and writes it back in full. Saves are verified by reading the
//! value back and comparing it byte for byte with what was written.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::watch;

use crate::config::PersistenceConfig;
use crate::error::{FolioError, Result};
use crate::model::{
    generate_id, increment_version, migrate_portfolio, Portfolio, PortfolioDraft,
};
use crate::state::status::{SaveStatus, StatusTracker};
use crate::state::store::KeyValueStore;
use crate::state::versions::{VersionHistory, VersionSnapshot};

/// Appended to the title of a duplicated portfolio.
pub const COPY_SUFFIX: &str = " (Copy)";

/// Persistent collection of portfolios plus their version histories.
pub struct PortfolioLibrary {
    store: Arc<dyn KeyValueStore>,
    history: VersionHistory,
    library_key: String,
    status: StatusTracker,
    /// Serializes read-modify-write-verify cycles on the collection.
    write_lock: Mutex<()>,
}

impl PortfolioLibrary {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(store, &PersistenceConfig::default())
    }

    pub fn with_config(store: Arc<dyn KeyValueStore>, config: &PersistenceConfig) -> Self {
        Self {
            history: VersionHistory::new(Arc::clone(&store), config),
            store,
            library_key: config.library_key.clone(),
            status: StatusTracker::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn library_key(&self) -> &str {
        &self.library_key
    }

    pub fn versions(&self) -> &VersionHistory {
        &self.history
    }

    pub fn status(&self) -> SaveStatus {
        self.status.get()
    }

    pub(crate) fn set_status(&self, status: SaveStatus) {
        self.status.set(status);
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    /// Raw records. Missing, unreadable or non-array data is an empty
    /// collection.
    fn load_records(&self) -> Vec<Value> {
        let raw = match self.store.get(&self.library_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.library_key, error = %e, "library unreadable, treating as empty");
                return Vec::new();
            }
        };
        parse_records(&self.library_key, &raw)
    }

    /// Every portfolio, in insertion order. Records that cannot be decoded
    /// are skipped here but kept in the store.
    pub fn list_all(&self) -> Vec<Portfolio> {
        self.load_records()
            .into_iter()
            .filter_map(decode_record)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Portfolio> {
        self.list_all().into_iter().find(|p| p.id == id)
    }

    /// Like [`PortfolioLibrary::get`], but a missing id is an error.
    pub fn require(&self, id: &str) -> Result<Portfolio> {
        self.get(id).ok_or_else(|| FolioError::PortfolioNotFound { id: id.to_string() })
    }

    /// Save a draft and return the stored portfolio.
    ///
    /// Status goes to `Saving` for the attempt, then `Saved` or `Unsaved`.
    /// When `create_version` is set and the id already exists, the stored
    /// portfolio is snapshotted before it is overwritten.
    pub fn save(&self, draft: PortfolioDraft, create_version: bool) -> Result<Portfolio> {
        self.status.set(SaveStatus::Saving);
        let result = self.save_inner(draft, create_version);
        match &result {
            Ok(portfolio) => {
                self.status.set(SaveStatus::Saved);
                tracing::info!(id = %portfolio.id, version = %portfolio.version, "portfolio saved");
            }
            Err(e) => {
                self.status.set(SaveStatus::Unsaved);
                tracing::warn!(error = %e, "portfolio save failed");
            }
        }
        result
    }

    fn save_inner(&self, draft: PortfolioDraft, create_version: bool) -> Result<Portfolio> {
        if draft.title.trim().is_empty() {
            return Err(FolioError::validation("title", "must not be blank"));
        }

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let previous = self.store.get(&self.library_key)?;
        let mut records = previous
            .as_deref()
            .map(|raw| parse_records(&self.library_key, raw))
            .unwrap_or_default();

        let id = draft
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_id);
        let position = records.iter().position(|r| record_id(r) == Some(id.as_str()));
        let existing = position.and_then(|i| decode_record(records[i].clone()));

        let now = Utc::now();
        let portfolio = Portfolio {
            created_at: existing.as_ref().map_or(now, |p| p.created_at),
            updated_at: now,
            version: increment_version(existing.as_ref().map(|p| p.version.as_str())),
            title: draft.title,
            editor_state: draft.editor_state,
            global_theme: draft.global_theme,
            pages_count: draft.pages.len().max(1),
            blocks_count: draft.blocks.len(),
            pages: draft.pages,
            blocks: draft.blocks,
            id,
        };

        let record = serde_json::to_value(&portfolio)?;
        match position {
            Some(i) => records[i] = record,
            None => records.push(record),
        }
        // Serialize before touching the store so a failure leaves it as is.
        let payload = serde_json::to_string(&records)?;

        if create_version {
            if let Some(existing) = &existing {
                if let Err(e) = self.history.snapshot(&existing.id, existing) {
                    tracing::warn!(id = %existing.id, error = %e, "could not snapshot before save");
                }
            }
        }

        self.write_verified(&payload, previous.as_deref())?;
        Ok(portfolio)
    }

    /// Write the collection, read it back and compare. On mismatch the
    /// previous value is written back before reporting.
    fn write_verified(&self, payload: &str, previous: Option<&str>) -> Result<()> {
        let key = &self.library_key;
        self.store.set(key, payload)?;

        let read_back = self.store.get(key)?;
        if read_back.as_deref() == Some(payload) {
            return Ok(());
        }

        let rollback = match previous {
            Some(previous) => self.store.set(key, previous),
            None => self.store.remove(key),
        };
        if let Err(e) = rollback {
            tracing::warn!(key = %key, error = %e, "rollback after failed verification did not complete");
        }

        Err(FolioError::StorageIntegrity {
            key: key.clone(),
            reason: match read_back {
                Some(actual) => format!(
                    "read back {} bytes, wrote {} bytes",
                    actual.len(),
                    payload.len()
                ),
                None => "value missing after write".to_string(),
            },
        })
    }

    /// Remove a portfolio. Returns whether anything was removed; an unknown
    /// id leaves the store untouched.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let previous = match self.store.get(&self.library_key)? {
            Some(raw) => raw,
            None => return Ok(false),
        };
        let mut records = parse_records(&self.library_key, &previous);
        let before = records.len();
        records.retain(|r| record_id(r) != Some(id));
        if records.len() == before {
            tracing::debug!(id, "delete of unknown portfolio ignored");
            return Ok(false);
        }

        let payload = serde_json::to_string(&records)?;
        self.write_verified(&payload, Some(&previous))?;
        tracing::info!(id, "portfolio deleted");
        Ok(true)
    }

    /// Copy a portfolio under a new id with a suffixed title.
    pub fn duplicate(&self, id: &str) -> Result<Portfolio> {
        let original = self.require(id)?;
        let draft = PortfolioDraft {
            id: None,
            title: format!("{}{}", original.title, COPY_SUFFIX),
            editor_state: original.editor_state,
            global_theme: original.global_theme,
            pages: original.pages,
            blocks: original.blocks,
        };
        self.save(draft, false)
    }

    /// Snapshot a portfolio into its version history.
    pub fn snapshot(&self, portfolio_id: &str, data: &Portfolio) -> Result<VersionSnapshot> {
        self.history.snapshot(portfolio_id, data)
    }

    /// Snapshots, newest first.
    pub fn history(&self, portfolio_id: &str) -> Vec<VersionSnapshot> {
        self.history.history(portfolio_id)
    }

    pub fn purge_history(&self, portfolio_id: &str) -> Result<()> {
        self.history.purge(portfolio_id)
    }

    /// Make a snapshot the live portfolio.
    ///
    /// The current state is captured first, the snapshot is saved without
    /// creating a version, and only then is the captured state appended to
    /// the history. A failed restore therefore leaves the history as it was,
    /// and a successful one can itself be undone from the history.
    pub fn restore(&self, portfolio_id: &str, version_id: &str) -> Result<Portfolio> {
        let snapshot = self
            .history
            .find(portfolio_id, version_id)
            .ok_or_else(|| FolioError::VersionNotFound {
                portfolio_id: portfolio_id.to_string(),
                version_id: version_id.to_string(),
            })?;
        snapshot.verify()?;

        let current = self.get(portfolio_id);

        let mut draft = PortfolioDraft::from(snapshot.data);
        draft.id = Some(portfolio_id.to_string());
        let restored = self.save(draft, false)?;

        if let Some(current) = current {
            if let Err(e) = self.history.snapshot(portfolio_id, &current) {
                tracing::warn!(portfolio_id, error = %e, "could not snapshot pre-restore state");
            }
        }

        tracing::info!(portfolio_id, version_id, "version restored");
        Ok(restored)
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn parse_records(key: &str, raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            tracing::warn!(key, "library is not an array, treating as empty");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "library is corrupt, treating as empty");
            Vec::new()
        }
    }
}

fn decode_record(mut record: Value) -> Option<Portfolio> {
    migrate_portfolio(&mut record);
    match serde_json::from_value::<Portfolio>(record) {
        Ok(portfolio) => Some(portfolio),
        Err(e) => {
            tracing::warn!(error = %e, "skipping undecodable portfolio record");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EditorState;
    use crate::state::store::{MemoryStore, StoreError};

    fn library() -> (Arc<MemoryStore>, PortfolioLibrary) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), PortfolioLibrary::new(store))
    }

    fn draft(title: &str) -> PortfolioDraft {
        PortfolioDraft::new(title, EditorState::default())
    }

    #[test]
    fn test_save_assigns_id_and_version() {
        let (_store, lib) = library();
        let saved = lib.save(draft("Alice"), false).unwrap();
        assert!(saved.id.starts_with("portfolio_"));
        assert_eq!(saved.version, "1.0.1");
        assert_eq!(saved.pages_count, 1);
        assert_eq!(lib.status(), SaveStatus::Saved);
        assert_eq!(lib.list_all().len(), 1);
    }

    #[test]
    fn test_resave_bumps_version_and_keeps_created_at() {
        let (_store, lib) = library();
        let first = lib.save(draft("A"), false).unwrap();
        let second = lib.save(draft("A").with_id(first.id.clone()), false).unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.version, "1.0.2");
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(lib.list_all().len(), 1);
    }

    #[test]
    fn test_blank_title_rejected_and_store_unchanged() {
        let (store, lib) = library();
        lib.save(draft("Keep"), false).unwrap();
        let before = store.get("portfolio_library").unwrap();

        let err = lib.save(draft("   "), false).unwrap_err();
        assert!(matches!(err, FolioError::Validation { .. }));
        assert_eq!(store.get("portfolio_library").unwrap(), before);
        assert_eq!(lib.status(), SaveStatus::Unsaved);
    }

    #[test]
    fn test_create_version_snapshots_existing() {
        let (_store, lib) = library();
        let first = lib.save(draft("A"), false).unwrap();
        lib.save(draft("B").with_id(first.id.clone()), true).unwrap();

        let history = lib.history(&first.id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].data.title, "A");
        assert_eq!(history[0].version, "1.0.1");
    }

    #[test]
    fn test_corrupt_library_is_empty() {
        let (store, lib) = library();
        store.set("portfolio_library", "not json").unwrap();
        assert!(lib.list_all().is_empty());
        store.set("portfolio_library", "{\"id\": 1}").unwrap();
        assert!(lib.list_all().is_empty());
    }

    #[test]
    fn test_undecodable_records_survive_saves() {
        let (store, lib) = library();
        store
            .set("portfolio_library", r#"[{"id": "broken", "title": 5}]"#)
            .unwrap();
        lib.save(draft("Fresh"), false).unwrap();

        let raw: Vec<Value> =
            serde_json::from_str(&store.get("portfolio_library").unwrap().unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0]["id"], "broken");
        assert_eq!(lib.list_all().len(), 1);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (store, lib) = library();
        let saved = lib.save(draft("A"), false).unwrap();
        let before = store.get("portfolio_library").unwrap();

        assert!(!lib.delete("nope").unwrap());
        assert_eq!(store.get("portfolio_library").unwrap(), before);

        assert!(lib.delete(&saved.id).unwrap());
        assert!(!lib.delete(&saved.id).unwrap());
        assert!(lib.list_all().is_empty());
    }

    #[test]
    fn test_duplicate() {
        let (_store, lib) = library();
        let original = lib.save(draft("Alice"), false).unwrap();
        let copy = lib.duplicate(&original.id).unwrap();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.title, "Alice (Copy)");
        assert_eq!(lib.list_all().len(), 2);
        assert!(matches!(
            lib.duplicate("missing"),
            Err(FolioError::PortfolioNotFound { .. })
        ));
    }

    #[test]
    fn test_restore_order() {
        let (_store, lib) = library();
        let v1 = lib.save(draft("First"), false).unwrap();
        lib.save(draft("Second").with_id(v1.id.clone()), true).unwrap();

        let snapshot_id = lib.history(&v1.id)[0].id.clone();
        let restored = lib.restore(&v1.id, &snapshot_id).unwrap();
        assert_eq!(restored.title, "First");
        assert_eq!(restored.id, v1.id);
        assert_eq!(restored.version, "1.0.3");

        // Pre-restore state is now the newest snapshot.
        let history = lib.history(&v1.id);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].data.title, "Second");
    }

    #[test]
    fn test_restore_unknown_version() {
        let (_store, lib) = library();
        let saved = lib.save(draft("A"), false).unwrap();
        assert!(matches!(
            lib.restore(&saved.id, "version_missing"),
            Err(FolioError::VersionNotFound { .. })
        ));
    }

    /// Returns a different value than the one written.
    struct LossyStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for LossyStore {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
            Ok(self.inner.get(key)?.map(|v| v.replace("Lossy", "Lossx")))
        }
        fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
            self.inner.remove(key)
        }
        fn keys(&self) -> std::result::Result<Vec<String>, StoreError> {
            self.inner.keys()
        }
    }

    #[test]
    fn test_verification_mismatch_is_integrity_error() {
        let store = Arc::new(LossyStore {
            inner: MemoryStore::new(),
        });
        let lib = PortfolioLibrary::new(store.clone());
        let err = lib.save(draft("Lossy"), false).unwrap_err();
        assert!(matches!(err, FolioError::StorageIntegrity { .. }));
        assert_eq!(lib.status(), SaveStatus::Unsaved);
        // Rolled back to "nothing stored".
        assert_eq!(store.inner.get("portfolio_library").unwrap(), None);
    }

    #[test]
    fn test_quota_error_is_distinct() {
        let store = Arc::new(MemoryStore::with_quota(64));
        let lib = PortfolioLibrary::new(store);
        let err = lib.save(draft("Too big for the quota"), false).unwrap_err();
        assert!(matches!(err, FolioError::StorageQuota { .. }));
    }
}
