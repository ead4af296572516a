//! Key-value storage backends.
//!
//! Values are whole JSON documents. A write replaces the previous value in
//! full, so a reader always sees either the old or the new document.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use walkdir::WalkDir;

use crate::error::FolioError;

/// File extension used by [`FileStore`].
const VALUE_EXTENSION: &str = ".json";

/// Suffix of in-flight writes.
const TEMP_SUFFIX: &str = ".tmp";

/// Errors reported by a store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("quota exceeded writing '{key}': {needed_bytes} bytes needed, limit {limit_bytes}")]
    QuotaExceeded {
        key: String,
        needed_bytes: usize,
        limit_bytes: usize,
    },

    #[error("invalid key '{key}'")]
    InvalidKey { key: String },

    #[error("I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backend error on '{key}': {reason}")]
    Backend { key: String, reason: String },
}

impl From<StoreError> for FolioError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::QuotaExceeded {
                key,
                needed_bytes,
                limit_bytes,
            } => FolioError::StorageQuota {
                key,
                needed_bytes,
                limit_bytes,
            },
            StoreError::InvalidKey { ref key }
            | StoreError::Io { ref key, .. }
            | StoreError::Backend { ref key, .. } => FolioError::StorageWrite {
                key: key.clone(),
                reason: err.to_string(),
            },
        }
    }
}

/// A string-keyed store of whole values.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// All keys, sorted.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Byte budget, if the backend enforces one.
    fn quota_bytes(&self) -> Option<usize> {
        None
    }

    /// Bytes in use, counted as key length plus value length.
    fn used_bytes(&self) -> Result<usize, StoreError> {
        let mut total = 0;
        for key in self.keys()? {
            let len = self.get(&key)?.map_or(0, |v| v.len());
            total += key.len() + len;
        }
        Ok(total)
    }
}

/// Usage after replacing `key` with `value`, given per-key sizes.
fn projected_usage<'a>(
    entries: impl Iterator<Item = (&'a str, usize)>,
    key: &str,
    value: &str,
) -> usize {
    let others: usize = entries
        .filter(|(k, _)| *k != key)
        .map(|(k, len)| k.len() + len)
        .sum();
    others + key.len() + value.len()
}

fn check_quota(quota: Option<usize>, key: &str, needed: usize) -> Result<(), StoreError> {
    match quota {
        Some(limit) if needed > limit => Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            needed_bytes: needed,
            limit_bytes: limit,
        }),
        _ => Ok(()),
    }
}

/// In-process store with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let needed = projected_usage(
            entries.iter().map(|(k, v)| (k.as_str(), v.len())),
            key,
            value,
        );
        check_quota(self.quota_bytes, key, needed)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.keys().cloned().collect())
    }

    fn quota_bytes(&self) -> Option<usize> {
        self.quota_bytes
    }
}

/// Directory-backed store: one `<key>.json` file per key.
///
/// Writes go to a temporary file that is renamed over the target, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    quota_bytes: Option<usize>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> crate::error::Result<Self> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| FolioError::DirectoryCreate {
                path: root.clone(),
                source: e,
            })?;
        }
        Ok(Self {
            root,
            quota_bytes: None,
        })
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys map straight to file names, so only a safe alphabet is allowed.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(format!("{}{}", key, VALUE_EXTENSION)))
    }

    fn io_err(key: &str) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            key: key.to_string(),
            source,
        }
    }

    fn sizes(&self) -> Result<Vec<(String, usize)>, StoreError> {
        let mut sizes = Vec::new();
        for key in self.keys()? {
            let path = self.path_for(&key)?;
            let len = fs::metadata(&path).map_err(Self::io_err(&key))?.len();
            sizes.push((key, len as usize));
        }
        Ok(sizes)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(key)(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;

        if self.quota_bytes.is_some() {
            let sizes = self.sizes()?;
            let needed = projected_usage(
                sizes.iter().map(|(k, len)| (k.as_str(), *len)),
                key,
                value,
            );
            check_quota(self.quota_bytes, key, needed)?;
        }

        let tmp = self.root.join(format!("{}{}{}", key, VALUE_EXTENSION, TEMP_SUFFIX));
        fs::write(&tmp, value).map_err(Self::io_err(key))?;
        fs::rename(&tmp, &path).map_err(Self::io_err(key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(key)(e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = WalkDir::new(&self.root)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_suffix(VALUE_EXTENSION))
                    .map(str::to_string)
            })
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn quota_bytes(&self) -> Option<usize> {
        self.quota_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("b", "22").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);
        assert_eq!(store.used_bytes().unwrap(), 2 + 3);
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_memory_store_quota() {
        let store = MemoryStore::with_quota(10);
        store.set("k", "12345").unwrap();
        // Replacing a value only counts the new size.
        store.set("k", "123456789").unwrap();

        let err = store.set("k", "1234567890").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { needed_bytes: 11, limit_bytes: 10, .. }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("123456789"));
    }

    #[test]
    fn test_quota_maps_to_storage_quota() {
        let err: FolioError = StoreError::QuotaExceeded {
            key: "k".into(),
            needed_bytes: 2,
            limit_bytes: 1,
        }
        .into();
        assert_eq!(err.error_code(), "STORAGE_QUOTA_EXCEEDED");

        let err: FolioError = StoreError::Backend {
            key: "k".into(),
            reason: "boom".into(),
        }
        .into();
        assert_eq!(err.error_code(), "STORAGE_WRITE");
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store")).unwrap();

        store.set("portfolio_library", "[]").unwrap();
        store.set("portfolio_versions_p1", "[1]").unwrap();
        assert_eq!(store.get("portfolio_library").unwrap().as_deref(), Some("[]"));
        assert_eq!(
            store.keys().unwrap(),
            vec!["portfolio_library", "portfolio_versions_p1"]
        );

        store.remove("portfolio_library").unwrap();
        assert_eq!(store.get("portfolio_library").unwrap(), None);
        store.remove("portfolio_library").unwrap();
    }

    #[test]
    fn test_file_store_rejects_unsafe_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey { .. })));
    }

    #[test]
    fn test_file_store_quota_leaves_old_value() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap().with_quota(20);
        store.set("key", "small").unwrap();
        let err = store.set("key", &"x".repeat(64)).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(store.get("key").unwrap().as_deref(), Some("small"));
    }
}
