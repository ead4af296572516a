//! Web font loading.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::export::assets::{AssetError, AssetFetcher};

/// Weights requested for every web font.
pub const FONT_WEIGHTS: &str = "300;400;500;600;700;800";

/// Fallback stack used when a font is unavailable.
pub const FALLBACK_STACK: &str = "sans-serif";

const GOOGLE_FONTS_CSS: &str = "https://fonts.googleapis.com/css2";

/// Stylesheet URL for a family.
pub fn stylesheet_url(family: &str) -> String {
    let name = family.split_whitespace().collect::<Vec<_>>().join("+");
    format!(
        "{}?family={}:wght@{}&display=swap",
        GOOGLE_FONTS_CSS, name, FONT_WEIGHTS
    )
}

/// CSS `font-family` value with the fallback stack appended.
pub fn font_stack(family: &str) -> String {
    let family = family.trim();
    if family.is_empty() {
        return FALLBACK_STACK.to_string();
    }
    format!("'{}', {}", family.replace('\'', ""), FALLBACK_STACK)
}

/// Makes fonts available to exported documents.
#[async_trait]
pub trait FontProvider: Send + Sync {
    /// Make `family` available.
    async fn load(&self, family: &str) -> Result<(), AssetError>;

    /// Whether `family` is ready to render.
    async fn is_available(&self, family: &str) -> bool;
}

/// Loads fonts from the Google Fonts stylesheet endpoint.
///
/// The stylesheet is fetched once per family; the system font never is.
pub struct WebFontProvider {
    fetcher: Arc<dyn AssetFetcher>,
    system_font: String,
    loaded: Mutex<HashSet<String>>,
}

impl WebFontProvider {
    pub fn new(fetcher: Arc<dyn AssetFetcher>, system_font: impl Into<String>) -> Self {
        Self {
            fetcher,
            system_font: system_font.into(),
            loaded: Mutex::new(HashSet::new()),
        }
    }

    fn is_system(&self, family: &str) -> bool {
        family.trim().is_empty() || family.trim() == self.system_font
    }

    fn is_loaded(&self, family: &str) -> bool {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(family)
    }
}

#[async_trait]
impl FontProvider for WebFontProvider {
    async fn load(&self, family: &str) -> Result<(), AssetError> {
        if self.is_system(family) || self.is_loaded(family) {
            return Ok(());
        }

        let url = stylesheet_url(family);
        self.fetcher.fetch(&url).await?;
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(family.to_string());
        tracing::debug!(family, "web font loaded");
        Ok(())
    }

    async fn is_available(&self, family: &str) -> bool {
        self.is_system(family) || self.is_loaded(family)
    }
}

/// Provider for environments with every font installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFonts;

#[async_trait]
impl FontProvider for SystemFonts {
    async fn load(&self, _family: &str) -> Result<(), AssetError> {
        Ok(())
    }

    async fn is_available(&self, _family: &str) -> bool {
        true
    }
}
