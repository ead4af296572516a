//! Portfolio records.
//!
//! A [`Portfolio`] is the persisted, identified and versioned container for
//! one [`EditorState`]. A [`PortfolioDraft`] is what callers hand to the
//! library when saving; the library turns it into a `Portfolio`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::model::editor_state::{EditorState, TextSettings};
use crate::model::lenient;

/// Version assigned before the first save bumps it.
pub const BASE_VERSION: Version = Version {
    major: 1,
    minor: 0,
    patch: 0,
};

/// Generate a fresh portfolio id.
pub fn generate_id() -> String {
    format!("portfolio_{}", Uuid::new_v4().simple())
}

/// A stored portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    /// Unique identifier, immutable after creation.
    pub id: String,

    pub title: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Semver-like string; the patch component grows on every save.
    pub version: String,

    #[serde(default)]
    pub editor_state: EditorState,

    /// Theme tokens written by older editors; third tier of style fallback.
    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub global_theme: Option<GlobalTheme>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub pages: Vec<Page>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub blocks: Vec<BlockEntry>,

    #[serde(default)]
    pub pages_count: usize,

    #[serde(default)]
    pub blocks_count: usize,
}

impl Portfolio {
    /// Parsed form of [`Portfolio::version`].
    pub fn parsed_version(&self) -> Version {
        Version::parse_or_base(&self.version)
    }
}

/// Input to a save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDraft {
    /// Existing id to overwrite, or `None` to create a new portfolio.
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub editor_state: EditorState,

    #[serde(default)]
    pub global_theme: Option<GlobalTheme>,

    #[serde(default)]
    pub pages: Vec<Page>,

    #[serde(default)]
    pub blocks: Vec<BlockEntry>,
}

impl PortfolioDraft {
    pub fn new(title: impl Into<String>, editor_state: EditorState) -> Self {
        Self {
            title: title.into(),
            editor_state,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl From<Portfolio> for PortfolioDraft {
    fn from(portfolio: Portfolio) -> Self {
        Self {
            id: Some(portfolio.id),
            title: portfolio.title,
            editor_state: portfolio.editor_state,
            global_theme: portfolio.global_theme,
            pages: portfolio.pages,
            blocks: portfolio.blocks,
        }
    }
}

/// Theme tokens under their legacy snake_case names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalTheme {
    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub colors: Option<ThemeColors>,

    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub typography: Option<TextSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeColors {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub background_color_2: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub card_background: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, Value>,
}

/// Ordered block descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockEntry {
    #[serde(rename = "type", default)]
    pub block_type: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub order: u32,
}

fn default_true() -> bool {
    true
}

/// Three-part version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Parse `major.minor.patch`. Missing or unparsable parts take the
    /// base values (major 1, minor 0, patch 0).
    pub fn parse_or_base(text: &str) -> Self {
        let mut parts = text.trim().split('.');
        let mut next = |fallback: u64| {
            parts
                .next()
                .and_then(|p| p.trim().parse::<u64>().ok())
                .unwrap_or(fallback)
        };
        Self {
            major: next(BASE_VERSION.major),
            minor: next(BASE_VERSION.minor),
            patch: next(BASE_VERSION.patch),
        }
    }

    pub fn bump_patch(self) -> Self {
        Self {
            patch: self.patch.saturating_add(1),
            ..self
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Next version after `current`; `None` starts from [`BASE_VERSION`].
pub fn increment_version(current: Option<&str>) -> String {
    current
        .map(Version::parse_or_base)
        .unwrap_or(BASE_VERSION)
        .bump_patch()
        .to_string()
}
