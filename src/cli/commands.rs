//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use crate::config::FolioConfig;
use crate::error::{FolioError, Result};
use crate::export::{CompositeFetcher, ExportService, ExportedDocument};
use crate::model::{migrate_portfolio, PortfolioDraft};
use crate::render::render_markup;
use crate::state::{check_storage_health, storage_usage, FileStore, PortfolioLibrary};

/// Open the library in `store_dir`.
pub fn open_library(store_dir: &Path, config: &FolioConfig) -> Result<Arc<PortfolioLibrary>> {
    let mut store = FileStore::open(store_dir)?;
    if let Some(quota) = config.persistence.quota_bytes {
        store = store.with_quota(quota);
    }
    Ok(Arc::new(PortfolioLibrary::with_config(
        Arc::new(store),
        &config.persistence,
    )))
}

/// List stored portfolios.
pub fn list(library: &PortfolioLibrary) -> Result<()> {
    let portfolios = library.list_all();
    if portfolios.is_empty() {
        println!("No portfolios.");
        return Ok(());
    }

    println!("{:<44} {:<10} {:<20} Title", "Id", "Version", "Updated");
    println!("{:-<90}", "");
    for p in &portfolios {
        println!(
            "{:<44} {:<10} {:<20} {}",
            p.id,
            p.version,
            p.updated_at.format("%Y-%m-%d %H:%M:%S"),
            p.title
        );
    }
    Ok(())
}

/// Print a portfolio as JSON.
pub fn show(library: &PortfolioLibrary, id: &str) -> Result<()> {
    let portfolio = library.require(id)?;
    println!("{}", serde_json::to_string_pretty(&portfolio)?);
    Ok(())
}

/// Save a draft read from a JSON file.
///
/// Accepts both drafts and full portfolio records, including records in
/// older layouts.
pub fn import(library: &PortfolioLibrary, file: &Path, create_version: bool) -> Result<()> {
    info!("Importing portfolio from: {}", file.display());

    let content = fs::read_to_string(file).map_err(|e| FolioError::FileRead {
        path: file.to_path_buf(),
        source: e,
    })?;
    let mut value: serde_json::Value = serde_json::from_str(&content)?;
    migrate_portfolio(&mut value);
    let draft: PortfolioDraft = serde_json::from_value(value)?;

    let saved = library.save(draft, create_version)?;
    println!("Saved {} (version {})", saved.id, saved.version);
    Ok(())
}

/// Delete a portfolio.
pub fn delete(library: &PortfolioLibrary, id: &str) -> Result<()> {
    if library.delete(id)? {
        println!("Deleted {}", id);
    } else {
        warn!("No portfolio with id {}", id);
        println!("Nothing to delete.");
    }
    Ok(())
}

/// Copy a portfolio under a new id.
pub fn duplicate(library: &PortfolioLibrary, id: &str) -> Result<()> {
    let copy = library.duplicate(id)?;
    println!("Created {} \"{}\"", copy.id, copy.title);
    Ok(())
}

/// Show saved versions, newest first.
pub fn history(library: &PortfolioLibrary, id: &str) -> Result<()> {
    let versions = library.history(id);
    if versions.is_empty() {
        println!("No saved versions.");
        return Ok(());
    }

    println!("Version History:");
    println!("{:-<60}", "");
    for v in &versions {
        println!(
            "{}: {} \"{}\" ({})",
            v.id,
            v.version,
            v.data.title,
            v.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!("{:-<60}", "");
    println!(
        "{} of {} versions kept",
        versions.len(),
        library.versions().max_versions()
    );
    Ok(())
}

/// Restore a saved version.
pub fn restore(library: &PortfolioLibrary, id: &str, version_id: &str) -> Result<()> {
    info!("Restoring {} to {}", id, version_id);
    let restored = library.restore(id, version_id)?;
    println!("Restored {} (now version {})", restored.id, restored.version);
    Ok(())
}

/// Print rendered markup.
pub fn render(library: &PortfolioLibrary, id: &str) -> Result<()> {
    let portfolio = library.require(id)?;
    print!("{}", render_markup(&portfolio));
    Ok(())
}

/// Export a standalone HTML document into `out`.
pub async fn export_html(
    library: Arc<PortfolioLibrary>,
    config: &FolioConfig,
    id: &str,
    out: &Path,
    assets: Option<&Path>,
) -> Result<()> {
    info!("Exporting {} to {}", id, out.display());

    let fetcher = Arc::new(CompositeFetcher::standard(assets.map(Path::to_path_buf)));
    let service = ExportService::new(library, config.export.clone()).with_fetcher(fetcher);
    let doc: ExportedDocument = service.export_flat(id).await?;

    for w in &doc.warnings {
        warn!("{}", w.message);
    }
    let path = doc.write_to(out)?;
    println!("Exported: {} ({} bytes)", path.display(), doc.bytes.len());
    Ok(())
}

/// Show storage usage and health warnings.
pub fn usage(library: &PortfolioLibrary) -> Result<()> {
    let usage = storage_usage(library)?;
    println!("Storage Usage:");
    println!("{:-<60}", "");
    println!("Keys:           {}", usage.key_count);
    println!("Portfolios:     {}", usage.portfolio_count);
    println!("Histories:      {}", usage.history_keys.len());
    println!("Total:          {:.1} KB", usage.total_kb());
    if let Some(ratio) = usage.quota_ratio() {
        println!("Quota used:     {:.0}%", ratio * 100.0);
    }

    for warning in check_storage_health(library)? {
        warn!("{}", warning);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_import_accepts_legacy_record() {
        let dir = tempdir().unwrap();
        let library = open_library(&dir.path().join("store"), &FolioConfig::default()).unwrap();

        let file = dir.path().join("draft.json");
        fs::write(
            &file,
            r#"{"title": "Legacy", "editorState": {"socialLinks": {"github": "https://github.com/a"}}}"#,
        )
        .unwrap();
        import(&library, &file, false).unwrap();

        let all = library.list_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].editor_state.social_links[0].platform, "github");
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempdir().unwrap();
        let library = open_library(dir.path(), &FolioConfig::default()).unwrap();
        let err = import(&library, &dir.path().join("nope.json"), false).unwrap_err();
        assert!(matches!(err, FolioError::FileRead { .. }));
    }

    #[tokio::test]
    async fn test_export_html_writes_file() {
        let dir = tempdir().unwrap();
        let library = open_library(&dir.path().join("store"), &FolioConfig::default()).unwrap();
        let saved = library
            .save(PortfolioDraft::new("My CV", Default::default()), false)
            .unwrap();

        let out = dir.path().join("out");
        export_html(library, &FolioConfig::default(), &saved.id, &out, None)
            .await
            .unwrap();
        let html = fs::read_to_string(out.join("My_CV.html")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
