//! Editor State Schema
//!
//! The single serializable description of one portfolio's content and
//! visual configuration. Field names follow the stored camelCase layout,
//! including the legacy snake_case aliases older editors wrote, so that a
//! load/save cycle never drops data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::lenient;

/// Block-visibility ids understood by the renderer.
pub mod block_ids {
    pub const HERO: &str = "block-hero";
    pub const CONTACTS: &str = "block-contacts";
    pub const SKILLS: &str = "block-skills";
    pub const EXPERIENCE: &str = "block-experience";
    pub const EDUCATION: &str = "block-education";
    pub const CERTIFICATES: &str = "block-certificates";
    pub const LANGUAGES: &str = "block-languages";
    pub const WORKS: &str = "block-works";
    pub const CUSTOM: &str = "block-custom";
}

/// Full editor state for one portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<ColorScheme>,

    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub text_settings: Option<TextSettings>,

    /// Avatar URL or embedded data URI.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Legacy avatar key.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub avatar_src: Option<String>,

    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub avatar_shape: Option<AvatarShape>,

    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub layout_settings: Option<LayoutSettings>,

    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Contacts>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub social_links: Vec<SocialLink>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub skills: Vec<String>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub experience: Vec<Experience>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub education: Vec<Education>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub certificates: Vec<Certificate>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub languages: Vec<Language>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub items: Vec<PortfolioItem>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub custom_blocks: Vec<CustomBlock>,

    /// Block id to visibility; absent ids are visible.
    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub block_visibility: Option<BTreeMap<String, bool>>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, Value>,
}

impl EditorState {
    /// Whether a block id is visible. Absent entries default to visible.
    pub fn is_block_visible(&self, block_id: &str) -> bool {
        self.block_visibility
            .as_ref()
            .and_then(|map| map.get(block_id))
            .copied()
            .unwrap_or(true)
    }

    /// Set the visibility of a block id.
    pub fn set_block_visible(&mut self, block_id: &str, visible: bool) {
        self.block_visibility
            .get_or_insert_with(BTreeMap::new)
            .insert(block_id.to_string(), visible);
    }
}

/// Color settings, including legacy snake_case aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorScheme {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub background2: Option<String>,

    /// Raw background mode. Kept as text so an explicit-but-empty value
    /// stays distinguishable from an absent one.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub background_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub card_background: Option<String>,

    #[serde(rename = "primary_color", default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub legacy_primary: Option<String>,

    #[serde(rename = "accent_color", default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub legacy_accent: Option<String>,

    #[serde(rename = "background_color", default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub legacy_background: Option<String>,

    #[serde(rename = "background_color_2", default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub legacy_background2: Option<String>,

    #[serde(rename = "card_background", default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub legacy_card_background: Option<String>,
}

/// Typography settings. Sizes are pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSettings {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub h1_size: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub h2_size: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub body_size: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,

    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

/// Layout settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSettings {
    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub spacing_preset: Option<SpacingPreset>,

    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub card_style: Option<CardStyle>,

    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub border_radius_preset: Option<RadiusPreset>,

    /// Legacy name of `borderRadiusPreset`.
    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<RadiusPreset>,

    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub grid_columns: Option<u32>,

    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub item_preview_size: Option<u32>,

    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarShape {
    #[default]
    Circle,
    Rounded,
    Square,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacingPreset {
    Compact,
    #[default]
    Normal,
    Spacious,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStyle {
    #[default]
    Elevated,
    Flat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadiusPreset {
    None,
    Small,
    #[default]
    Medium,
    Large,
}

/// Contact details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contacts {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub level: LanguageLevel,
}

/// Proficiency level. Levels outside the known set are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Native,
    #[serde(untagged)]
    Custom(String),
}

impl LanguageLevel {
    pub fn label(&self) -> &str {
        match self {
            LanguageLevel::Beginner => "Beginner",
            LanguageLevel::Intermediate => "Intermediate",
            LanguageLevel::Advanced => "Advanced",
            LanguageLevel::Native => "Native",
            LanguageLevel::Custom(level) => level,
        }
    }
}

/// Work entry kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Gallery,
    Video,
    Link,
    #[default]
    #[serde(other)]
    Text,
}

/// Type-specific payload of a work entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentData {
    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, Value>,
}

/// A portfolio work entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub content_data: Option<ContentData>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, Value>,
}

/// A free-form block rendered with its own two-column sub-layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomBlock {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Percentage of the row given to the image column.
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub image_size_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub title_font_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub block_padding: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Saved layout hint; the renderer always uses text-left, image-right.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, Value>,
}
