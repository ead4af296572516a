//! Export Service
//!
//! Both formats share one pipeline: resolve the portfolio, make its font
//! available, render, inline images, wrap in a standalone shell. The flat
//! format stops there; the paginated format waits for fonts and layout to
//! settle and hands the shell to a [`Rasterizer`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::config::ExportConfig;
use crate::error::{FolioError, Result};
use crate::export::assets::{
    inline_images, is_blob, AssetError, AssetFetcher, AssetWarning, CompositeFetcher,
};
use crate::export::fonts::{FontProvider, WebFontProvider};
use crate::export::paginated::{RasterJob, Rasterizer};
use crate::export::shell::{document_shell, ShellOptions, AVOID_BREAK_SELECTOR};
use crate::model::{ContentType, Portfolio};
use crate::render::{render_with_style, ResolvedStyle};
use crate::state::PortfolioLibrary;

/// MIME type of flat exports.
pub const FLAT_MIME: &str = "text/html;charset=utf-8";

/// Base name used when a title has nothing usable in it.
const DEFAULT_FILE_STEM: &str = "portfolio";

/// A finished export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedDocument {
    pub filename: String,
    pub mime: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Assets that were kept as plain references.
    pub warnings: Vec<AssetWarning>,
}

impl ExportedDocument {
    /// Write into `dir` under the document's filename.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| FolioError::DirectoryCreate {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes).map_err(|e| FolioError::FileWrite {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}

/// Result of a readiness check. Problems are advisory; export still runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReadiness {
    pub warnings: Vec<String>,
}

impl ExportReadiness {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Output filename: every character outside `[A-Za-z0-9]` becomes `_`.
pub fn export_filename(title: &str, extension: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() {
        DEFAULT_FILE_STEM.to_string()
    } else {
        stem
    };
    format!("{}.{}", stem, extension)
}

/// Public view link for a portfolio.
pub fn shareable_link(base_url: &str, portfolio_id: &str) -> String {
    format!("{}/view/{}", base_url.trim_end_matches('/'), portfolio_id)
}

/// Image references that will not survive export: blank values and
/// in-memory blob URLs.
pub fn validate_export_readiness(portfolio: &Portfolio) -> ExportReadiness {
    let state = &portfolio.editor_state;
    let mut refs: Vec<(String, &str)> = Vec::new();

    if let Some(avatar) = state.avatar.as_deref().or(state.avatar_src.as_deref()) {
        refs.push(("Avatar".to_string(), avatar));
    }
    for item in &state.items {
        let label = if item.title.trim().is_empty() {
            "Untitled work".to_string()
        } else {
            item.title.clone()
        };
        match item.image.as_deref() {
            Some(image) => refs.push((label.clone(), image)),
            None if item.content_type == ContentType::Image => refs.push((label.clone(), "")),
            None => {}
        }
        if let Some(data) = &item.content_data {
            for image in &data.images {
                refs.push((label.clone(), image));
            }
        }
    }
    for block in &state.custom_blocks {
        if let Some(image) = block.image.as_deref() {
            let label = block
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Custom block".to_string());
            refs.push((label, image));
        }
    }

    let missing: Vec<String> = refs
        .into_iter()
        .filter(|(_, r)| r.trim().is_empty() || is_blob(r))
        .map(|(label, _)| label)
        .collect();

    let mut readiness = ExportReadiness::default();
    if !missing.is_empty() {
        tracing::warn!(count = missing.len(), "some images may not export correctly");
        readiness.warnings.push(format!(
            "Some images may not export correctly: {}",
            missing.join(", ")
        ));
    }
    readiness
}

/// Shared prefix of both pipelines.
struct Prepared {
    portfolio: Portfolio,
    style: ResolvedStyle,
    font_family: String,
    document: String,
    warnings: Vec<AssetWarning>,
}

/// Produces standalone documents from stored portfolios.
pub struct ExportService {
    library: Arc<PortfolioLibrary>,
    fetcher: Arc<dyn AssetFetcher>,
    fonts: Arc<dyn FontProvider>,
    rasterizer: Option<Arc<dyn Rasterizer>>,
    config: ExportConfig,
}

impl ExportService {
    /// Service with the standard fetchers and web fonts, and no rasterizer.
    pub fn new(library: Arc<PortfolioLibrary>, config: ExportConfig) -> Self {
        let fetcher: Arc<dyn AssetFetcher> = Arc::new(CompositeFetcher::standard(None));
        let fonts = Arc::new(WebFontProvider::new(
            Arc::clone(&fetcher),
            config.system_font.clone(),
        ));
        Self {
            library,
            fetcher,
            fonts,
            rasterizer: None,
            config,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_fonts(mut self, fonts: Arc<dyn FontProvider>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Self-contained document reproducing the preview.
    pub async fn export_flat(&self, portfolio_id: &str) -> Result<ExportedDocument> {
        let prepared = self.prepare(portfolio_id, false).await?;
        let doc = ExportedDocument {
            filename: export_filename(&prepared.portfolio.title, "html"),
            mime: FLAT_MIME.to_string(),
            bytes: prepared.document.into_bytes(),
            warnings: prepared.warnings,
        };
        tracing::info!(
            id = portfolio_id,
            filename = %doc.filename,
            bytes = doc.bytes.len(),
            warnings = doc.warnings.len(),
            "flat export complete"
        );
        Ok(doc)
    }

    /// Fixed-page-size document rendered through the rasterizer.
    pub async fn export_paginated(&self, portfolio_id: &str) -> Result<ExportedDocument> {
        let rasterizer = self
            .rasterizer
            .clone()
            .ok_or_else(|| FolioError::dependency_missing("rasterizer"))?;

        let prepared = self.prepare(portfolio_id, true).await?;

        if !self.fonts.is_available(&prepared.font_family).await {
            tracing::debug!(family = %prepared.font_family, "font not confirmed, waiting fallback delay");
            tokio::time::sleep(self.config.font_fallback_delay()).await;
        }
        tokio::time::sleep(self.config.settle_delay()).await;

        let job = RasterJob {
            document: prepared.document,
            filename: export_filename(&prepared.portfolio.title, rasterizer.extension()),
            container_width_px: self.config.container_width_px,
            background: prepared.style.palette.background.clone(),
            page: self.config.page.clone(),
            avoid_break_selectors: vec![AVOID_BREAK_SELECTOR.to_string()],
        };
        let bytes = rasterizer.rasterize(&job).await?;

        let doc = ExportedDocument {
            filename: job.filename,
            mime: rasterizer.mime().to_string(),
            bytes,
            warnings: prepared.warnings,
        };
        tracing::info!(
            id = portfolio_id,
            filename = %doc.filename,
            bytes = doc.bytes.len(),
            "paginated export complete"
        );
        Ok(doc)
    }

    async fn prepare(&self, portfolio_id: &str, paginated: bool) -> Result<Prepared> {
        let portfolio = self.library.require(portfolio_id)?;
        let style = ResolvedStyle::for_portfolio(&portfolio);
        let mut warnings = Vec::new();

        let mut font_family = style.typography.font_family.clone();
        if font_family != self.config.system_font {
            let timeout = self.config.font_timeout();
            let loaded = match tokio::time::timeout(timeout, self.fonts.load(&font_family)).await {
                Ok(result) => result,
                Err(_) => Err(AssetError::Timeout {
                    reference: font_family.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                }),
            };
            if let Err(e) = loaded {
                tracing::warn!(family = %font_family, error = %e, "font load failed, using default stack");
                warnings.push(AssetWarning::from(&e));
                font_family = self.config.system_font.clone();
            }
        }

        let markup = render_with_style(&portfolio, &style);
        let inlined = inline_images(&markup, self.fetcher.as_ref(), self.config.image_timeout()).await;
        warnings.extend(inlined.warnings);
        tracing::debug!(id = portfolio_id, inlined = inlined.inlined, "images inlined");

        let options = ShellOptions {
            title: portfolio.title.clone(),
            lang: self.config.document_lang.clone(),
            font_family: font_family.clone(),
            system_font: self.config.system_font.clone(),
            background: style.palette.background.clone(),
            container_width_px: self.config.container_width_px,
            extra_stylesheet: self.config.stylesheet.clone(),
            paginated,
        };
        let document = document_shell(&inlined.markup, &options);

        Ok(Prepared {
            portfolio,
            style,
            font_family,
            document,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomBlock, EditorState, PortfolioItem};
    use chrono::Utc;
    use test_case::test_case;

    #[test_case("Alice", "Alice.html" ; "plain")]
    #[test_case("My Portfolio 2024!", "My_Portfolio_2024_.html" ; "spaces and punctuation")]
    #[test_case("Résumé", "R_sum_.html" ; "non ascii")]
    #[test_case("", "portfolio.html" ; "empty")]
    fn test_export_filename(title: &str, expected: &str) {
        assert_eq!(export_filename(title, "html"), expected);
    }

    #[test]
    fn test_shareable_link() {
        assert_eq!(
            shareable_link("https://folio.app/", "portfolio_1"),
            "https://folio.app/view/portfolio_1"
        );
    }

    fn portfolio(state: EditorState) -> Portfolio {
        let now = Utc::now();
        Portfolio {
            id: "p".into(),
            title: "T".into(),
            created_at: now,
            updated_at: now,
            version: "1.0.1".into(),
            editor_state: state,
            global_theme: None,
            pages: Vec::new(),
            blocks: Vec::new(),
            pages_count: 1,
            blocks_count: 0,
        }
    }

    #[test]
    fn test_readiness_flags_blank_and_blob_images() {
        let state = EditorState {
            avatar: Some("blob:http://x/1".into()),
            items: vec![
                PortfolioItem {
                    title: "Shot".into(),
                    content_type: ContentType::Image,
                    ..Default::default()
                },
                PortfolioItem {
                    title: "Fine".into(),
                    image: Some("fine.png".into()),
                    ..Default::default()
                },
            ],
            custom_blocks: vec![CustomBlock {
                image: Some(" ".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let readiness = validate_export_readiness(&portfolio(state));
        assert_eq!(
            readiness.warnings,
            vec!["Some images may not export correctly: Avatar, Shot, Custom block".to_string()]
        );
    }

    #[test]
    fn test_readiness_clean() {
        assert!(validate_export_readiness(&portfolio(EditorState::default())).is_clean());
    }
}
