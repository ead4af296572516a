//! Runtime configuration.
//!
//! Every knob has a default, so an empty or missing config file yields a
//! working setup. Files are camelCase JSON.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolioConfig {
    pub persistence: PersistenceConfig,
    pub export: ExportConfig,
}

impl FolioConfig {
    /// Load from a JSON file. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| FolioError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: FolioConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistenceConfig {
    /// Store key holding the whole portfolio collection.
    pub library_key: String,
    /// Prefix of per-portfolio version history keys.
    pub version_key_prefix: String,
    /// Snapshots kept per portfolio (oldest evicted first).
    pub max_versions: usize,
    pub max_undo_levels: usize,
    pub autosave_delay_ms: u64,
    /// Byte budget for stores that enforce one. `None` means unlimited.
    pub quota_bytes: Option<usize>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            library_key: "portfolio_library".to_string(),
            version_key_prefix: "portfolio_versions_".to_string(),
            max_versions: 50,
            max_undo_levels: 50,
            autosave_delay_ms: 2000,
            quota_bytes: None,
        }
    }
}

impl PersistenceConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

/// Paper size for paginated export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    /// Width and height in millimetres, portrait.
    pub fn size_mm(&self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page geometry and image settings for paginated export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSetup {
    pub format: PageFormat,
    pub orientation: Orientation,
    /// Margin on every side, in inches.
    pub margin_in: f64,
    /// JPEG quality in `0.0..=1.0`.
    pub image_quality: f64,
    /// Rasterization scale factor.
    pub scale: f64,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
            margin_in: 0.5,
            image_quality: 0.98,
            scale: 2.0,
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    /// Per-image wait before paginated export moves on.
    pub image_timeout_ms: u64,
    /// Upper bound on loading one web font.
    pub font_timeout_ms: u64,
    /// Wait used when the font probe cannot confirm availability.
    pub font_fallback_delay_ms: u64,
    /// Pause between layout and rasterization.
    pub settle_delay_ms: u64,
    pub container_width_px: u32,
    pub document_lang: String,
    /// Font that never needs loading.
    pub system_font: String,
    /// Extra stylesheet text embedded in exported documents.
    pub stylesheet: String,
    pub page: PageSetup,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            image_timeout_ms: 5000,
            font_timeout_ms: 5000,
            font_fallback_delay_ms: 500,
            settle_delay_ms: 500,
            container_width_px: 1200,
            document_lang: "en".to_string(),
            system_font: "Inter".to_string(),
            stylesheet: String::new(),
            page: PageSetup::default(),
        }
    }
}

impl ExportConfig {
    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }

    pub fn font_timeout(&self) -> Duration {
        Duration::from_millis(self.font_timeout_ms)
    }

    pub fn font_fallback_delay(&self) -> Duration {
        Duration::from_millis(self.font_fallback_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
