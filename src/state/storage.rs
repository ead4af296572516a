//! Storage Usage
//!
//! Reports how much of the store the library and its version histories
//! occupy, and warns before the quota runs out.

use serde::Serialize;

use crate::error::Result;
use crate::state::library::PortfolioLibrary;

/// Share of the quota above which a warning is raised.
const QUOTA_WARNING_RATIO: f64 = 0.8;

/// Storage usage statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    /// Number of keys in the store.
    pub key_count: usize,
    /// Key plus value bytes across the store.
    pub total_bytes: usize,
    /// Bytes held by the library key.
    pub library_bytes: usize,
    pub portfolio_count: usize,
    /// Keys holding version histories.
    pub history_keys: Vec<String>,
    pub quota_bytes: Option<usize>,
}

impl StorageUsage {
    /// Fraction of the quota in use, when there is a quota.
    pub fn quota_ratio(&self) -> Option<f64> {
        self.quota_bytes
            .filter(|q| *q > 0)
            .map(|q| self.total_bytes as f64 / q as f64)
    }

    pub fn total_kb(&self) -> f64 {
        self.total_bytes as f64 / 1024.0
    }
}

/// Calculate current storage usage.
pub fn storage_usage(library: &PortfolioLibrary) -> Result<StorageUsage> {
    let store = library.store();
    let keys = store.keys()?;
    let library_bytes = store
        .get(library.library_key())?
        .map_or(0, |v| library.library_key().len() + v.len());

    Ok(StorageUsage {
        key_count: keys.len(),
        total_bytes: store.used_bytes()?,
        library_bytes,
        portfolio_count: library.list_all().len(),
        history_keys: library.versions().history_keys()?,
        quota_bytes: store.quota_bytes(),
    })
}

/// Check storage health and return warnings.
///
/// Checks:
/// - usage above 80% of the quota
/// - version histories that reached their cap and now evict on every save
pub fn check_storage_health(library: &PortfolioLibrary) -> Result<Vec<String>> {
    let mut warnings = Vec::new();
    let usage = storage_usage(library)?;

    if let Some(ratio) = usage.quota_ratio() {
        if ratio > QUOTA_WARNING_RATIO {
            warnings.push(format!(
                "Storage is {:.0}% full ({:.1} KB). Delete old portfolios or export them to free space.",
                ratio * 100.0,
                usage.total_kb()
            ));
        }
    }

    let versions = library.versions();
    let cap = versions.max_versions();
    for key in &usage.history_keys {
        let portfolio_id = &key[versions.key_prefix().len()..];
        let kept = versions.history(portfolio_id).len();
        if kept >= cap {
            warnings.push(format!(
                "Portfolio {} has {} saved versions; older versions are now discarded on each save.",
                portfolio_id, kept
            ));
        }
    }

    Ok(warnings)
}
