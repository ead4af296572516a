//! Version history.
//!
//! Each portfolio has its own bounded, append-only list of snapshots under
//! `<prefix><portfolio id>`, stored apart from the main collection. The
//! oldest snapshot is evicted first once the cap is reached.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::PersistenceConfig;
use crate::error::{FolioError, Result};
use crate::model::Portfolio;
use crate::state::store::KeyValueStore;

/// Default number of snapshots kept per portfolio.
pub const DEFAULT_MAX_VERSIONS: usize = 50;

/// An immutable copy of a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSnapshot {
    pub id: String,
    pub portfolio_id: String,
    pub created_at: DateTime<Utc>,
    /// Portfolio version at the time of the snapshot.
    pub version: String,
    /// SHA-256 over the serialized `data`, hex encoded.
    pub checksum: String,
    pub data: Portfolio,
}

impl VersionSnapshot {
    fn capture(portfolio_id: &str, data: &Portfolio) -> Result<Self> {
        Ok(Self {
            id: format!("version_{}", Uuid::new_v4().simple()),
            portfolio_id: portfolio_id.to_string(),
            created_at: Utc::now(),
            version: data.version.clone(),
            checksum: checksum(data)?,
            data: data.clone(),
        })
    }

    /// Recompute the checksum and compare.
    pub fn verify(&self) -> Result<()> {
        let actual = checksum(&self.data)?;
        if actual != self.checksum {
            return Err(FolioError::StorageIntegrity {
                key: self.id.clone(),
                reason: format!(
                    "snapshot checksum mismatch (stored {}, computed {})",
                    self.checksum, actual
                ),
            });
        }
        Ok(())
    }
}

fn checksum(data: &Portfolio) -> Result<String> {
    let bytes = serde_json::to_vec(data)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Per-portfolio snapshot lists in a [`KeyValueStore`].
pub struct VersionHistory {
    store: Arc<dyn KeyValueStore>,
    key_prefix: String,
    max_versions: usize,
    write_lock: Mutex<()>,
}

impl VersionHistory {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &PersistenceConfig) -> Self {
        Self {
            store,
            key_prefix: config.version_key_prefix.clone(),
            max_versions: config.max_versions,
            write_lock: Mutex::new(()),
        }
    }

    pub fn key_for(&self, portfolio_id: &str) -> String {
        format!("{}{}", self.key_prefix, portfolio_id)
    }

    pub fn max_versions(&self) -> usize {
        self.max_versions
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Stored snapshots, oldest first. Missing or unreadable data is an
    /// empty history.
    fn load(&self, portfolio_id: &str) -> Vec<VersionSnapshot> {
        let key = self.key_for(portfolio_id);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "version history unreadable");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<VersionSnapshot>>(&raw) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "version history corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Append a snapshot of `data`, evicting the oldest beyond the cap.
    pub fn snapshot(&self, portfolio_id: &str, data: &Portfolio) -> Result<VersionSnapshot> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let snapshot = VersionSnapshot::capture(portfolio_id, data)?;
        let mut list = self.load(portfolio_id);
        list.push(snapshot.clone());
        if list.len() > self.max_versions {
            let excess = list.len() - self.max_versions;
            list.drain(..excess);
        }

        let key = self.key_for(portfolio_id);
        let payload = serde_json::to_string(&list)?;
        self.store.set(&key, &payload)?;

        tracing::debug!(
            portfolio_id,
            snapshot_id = %snapshot.id,
            kept = list.len(),
            "version snapshot stored"
        );
        Ok(snapshot)
    }

    /// Snapshots, newest first.
    pub fn history(&self, portfolio_id: &str) -> Vec<VersionSnapshot> {
        let mut list = self.load(portfolio_id);
        list.reverse();
        list
    }

    pub fn find(&self, portfolio_id: &str, version_id: &str) -> Option<VersionSnapshot> {
        self.load(portfolio_id)
            .into_iter()
            .find(|s| s.id == version_id)
    }

    /// Remove a portfolio's whole history.
    pub fn purge(&self, portfolio_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.remove(&self.key_for(portfolio_id))?;
        Ok(())
    }

    /// Store keys that hold version histories.
    pub fn history_keys(&self) -> Result<Vec<String>> {
        Ok(self
            .store
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&self.key_prefix))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EditorState;
    use crate::state::store::MemoryStore;

    fn portfolio(id: &str, version: &str) -> Portfolio {
        let now = Utc::now();
        Portfolio {
            id: id.to_string(),
            title: "T".to_string(),
            created_at: now,
            updated_at: now,
            version: version.to_string(),
            editor_state: EditorState::default(),
            global_theme: None,
            pages: Vec::new(),
            blocks: Vec::new(),
            pages_count: 1,
            blocks_count: 0,
        }
    }

    fn setup(cap: usize) -> (Arc<MemoryStore>, VersionHistory) {
        let store = Arc::new(MemoryStore::new());
        let config = PersistenceConfig {
            max_versions: cap,
            ..Default::default()
        };
        (store.clone(), VersionHistory::new(store, &config))
    }

    #[test]
    fn test_history_is_newest_first() {
        let (_store, history) = setup(10);
        history.snapshot("p", &portfolio("p", "1.0.1")).unwrap();
        history.snapshot("p", &portfolio("p", "1.0.2")).unwrap();

        let list = history.history("p");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].version, "1.0.2");
        assert_eq!(list[1].version, "1.0.1");
    }

    #[test]
    fn test_cap_keeps_most_recent() {
        let cap = 5;
        let (_store, history) = setup(cap);
        for patch in 1..=(cap + 3) {
            history
                .snapshot("p", &portfolio("p", &format!("1.0.{}", patch)))
                .unwrap();
        }

        let list = history.history("p");
        assert_eq!(list.len(), cap);
        let versions: Vec<&str> = list.iter().map(|s| s.version.as_str()).collect();
        assert_eq!(versions, vec!["1.0.8", "1.0.7", "1.0.6", "1.0.5", "1.0.4"]);
    }

    #[test]
    fn test_histories_are_per_portfolio() {
        let (_store, history) = setup(10);
        history.snapshot("a", &portfolio("a", "1.0.1")).unwrap();
        assert!(history.history("b").is_empty());
        assert_eq!(history.history_keys().unwrap(), vec!["portfolio_versions_a"]);
    }

    #[test]
    fn test_corrupt_history_is_empty() {
        let (store, history) = setup(10);
        store.set("portfolio_versions_p", "{oops").unwrap();
        assert!(history.history("p").is_empty());

        // Appending replaces the corrupt value.
        history.snapshot("p", &portfolio("p", "1.0.1")).unwrap();
        assert_eq!(history.history("p").len(), 1);
    }

    #[test]
    fn test_verify_detects_tampering() {
        let (_store, history) = setup(10);
        let mut snap = history.snapshot("p", &portfolio("p", "1.0.1")).unwrap();
        snap.verify().unwrap();

        let found = history.find("p", &snap.id).unwrap();
        found.verify().unwrap();

        snap.data.title = "changed".to_string();
        assert!(matches!(snap.verify(), Err(FolioError::StorageIntegrity { .. })));
    }

    #[test]
    fn test_purge() {
        let (store, history) = setup(10);
        history.snapshot("p", &portfolio("p", "1.0.1")).unwrap();
        history.purge("p").unwrap();
        assert!(store.keys().unwrap().is_empty());
    }
}
