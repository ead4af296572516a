//! Style resolution.
//!
//! Every field group resolves through the same ordered chain: the current
//! key, then its legacy name, then the portfolio's global theme, then a
//! built-in default. Each group has its own function so the chain can be
//! tested without rendering anything.

use crate::model::{
    AvatarShape, CardStyle, ColorScheme, EditorState, GlobalTheme, LayoutSettings, Portfolio,
    RadiusPreset, SpacingPreset, TextAlign, TextSettings, ThemeColors,
};
use crate::render::color::{is_light, optimal_text_color, HexColor};

pub const DEFAULT_PRIMARY: &str = "#2563EB";
pub const DEFAULT_ACCENT: &str = "#1E40AF";
pub const DEFAULT_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_BACKGROUND2: &str = "#f3f4f6";

const CARD_ON_LIGHT: &str = "#f9fafb";
const CARD_ON_DARK: &str = "#374151";
const NESTED_ON_LIGHT: &str = "#ffffff";
const NESTED_ON_DARK: &str = "#4B5563";

pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_FONT_WEIGHT: &str = "400";
pub const DEFAULT_H1_SIZE: f64 = 48.0;
pub const DEFAULT_H2_SIZE: f64 = 24.0;
pub const DEFAULT_BODY_SIZE: f64 = 16.0;
pub const DEFAULT_LINE_HEIGHT: f64 = 1.6;
pub const DEFAULT_LETTER_SPACING: f64 = 0.0;

/// How the page background is painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundMode {
    Solid,
    Gradient,
    /// A mode the renderer does not know, including an explicit empty
    /// string. Painted like `Solid` but kept distinct from "not set".
    Other(String),
}

impl BackgroundMode {
    /// Only a missing value means solid. A present value is taken as-is,
    /// even when it is empty.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => BackgroundMode::Solid,
            Some("solid") => BackgroundMode::Solid,
            Some("gradient") => BackgroundMode::Gradient,
            Some(other) => BackgroundMode::Other(other.to_string()),
        }
    }
}

/// Resolved colors, including the derived contrast colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub primary: String,
    pub accent: String,
    pub background: String,
    pub background2: String,
    pub background_mode: BackgroundMode,
    pub card_background: String,
    /// Text on the page background.
    pub text: &'static str,
    /// Text on cards.
    pub card_text: &'static str,
    /// Background of entries nested inside cards.
    pub nested_background: &'static str,
    pub nested_text: &'static str,
}

impl Palette {
    /// CSS `background` value for the page.
    pub fn page_background(&self) -> String {
        match self.background_mode {
            BackgroundMode::Gradient => format!(
                "linear-gradient(135deg, {} 0%, {} 100%)",
                self.background, self.background2
            ),
            BackgroundMode::Solid | BackgroundMode::Other(_) => self.background.clone(),
        }
    }

    pub fn is_gradient(&self) -> bool {
        self.background_mode == BackgroundMode::Gradient
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Typography {
    pub font_family: String,
    pub font_weight: String,
    pub h1_size: f64,
    pub h2_size: f64,
    pub body_size: f64,
    pub line_height: f64,
    pub letter_spacing: f64,
    pub text_align: TextAlign,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub block_spacing: u32,
    pub padding: u32,
    pub radius: &'static str,
    pub shadow: &'static str,
    pub avatar_radius: &'static str,
}

/// Everything the section builders need, resolved once per render.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub palette: Palette,
    pub typography: Typography,
    pub layout: Layout,
}

impl ResolvedStyle {
    pub fn for_portfolio(portfolio: &Portfolio) -> Self {
        resolve_style(&portfolio.editor_state, portfolio.global_theme.as_ref())
    }
}

pub fn resolve_style(state: &EditorState, theme: Option<&GlobalTheme>) -> ResolvedStyle {
    ResolvedStyle {
        palette: resolve_palette(state.color_scheme.as_ref(), theme),
        typography: resolve_typography(state.text_settings.as_ref(), theme),
        layout: resolve_layout(state.layout_settings.as_ref(), state.avatar_shape),
    }
}

/// First candidate that is a well-formed hex color, else `default`.
/// Blank and malformed values both fall through.
fn first_color<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>, default: &str) -> String {
    candidates
        .into_iter()
        .flatten()
        .find_map(HexColor::parse)
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|| default.to_string())
}

pub fn resolve_palette(scheme: Option<&ColorScheme>, theme: Option<&GlobalTheme>) -> Palette {
    let scheme_field = |f: fn(&ColorScheme) -> &Option<String>| {
        scheme.and_then(|s| f(s).as_deref())
    };
    let colors = theme.and_then(|t| t.colors.as_ref());
    let theme_field = |f: fn(&ThemeColors) -> &Option<String>| {
        colors.and_then(|c| f(c).as_deref())
    };

    let primary = first_color(
        [
            scheme_field(|s| &s.primary),
            scheme_field(|s| &s.legacy_primary),
            theme_field(|c| &c.primary_color),
        ],
        DEFAULT_PRIMARY,
    );
    let accent = first_color(
        [
            scheme_field(|s| &s.accent),
            scheme_field(|s| &s.legacy_accent),
            theme_field(|c| &c.accent_color),
        ],
        DEFAULT_ACCENT,
    );
    let background = first_color(
        [
            scheme_field(|s| &s.background),
            scheme_field(|s| &s.legacy_background),
            theme_field(|c| &c.background_color),
        ],
        DEFAULT_BACKGROUND,
    );
    let background2 = first_color(
        [
            scheme_field(|s| &s.background2),
            scheme_field(|s| &s.legacy_background2),
            theme_field(|c| &c.background_color_2),
        ],
        DEFAULT_BACKGROUND2,
    );

    let light = is_light(&background);
    let card_background = first_color(
        [
            scheme_field(|s| &s.card_background),
            scheme_field(|s| &s.legacy_card_background),
            theme_field(|c| &c.card_background),
        ],
        if light { CARD_ON_LIGHT } else { CARD_ON_DARK },
    );
    let nested_background = if light { NESTED_ON_LIGHT } else { NESTED_ON_DARK };

    Palette {
        text: optimal_text_color(&background),
        card_text: optimal_text_color(&card_background),
        nested_text: optimal_text_color(nested_background),
        background_mode: BackgroundMode::from_raw(scheme_field(|s| &s.background_type)),
        primary,
        accent,
        background,
        background2,
        card_background,
        nested_background,
    }
}

/// Zero counts as unset, matching how the editor clears a field.
fn first_number(candidates: [Option<f64>; 2], default: f64) -> f64 {
    candidates
        .into_iter()
        .flatten()
        .find(|v| v.is_finite() && *v != 0.0)
        .unwrap_or(default)
}

/// Font names are written inside a quoted CSS string.
fn clean_font_family(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '\\' | ';' | '<' | '>'))
        .collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

fn clean_font_weight(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let valid = !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| trimmed.to_string())
}

pub fn resolve_typography(
    settings: Option<&TextSettings>,
    theme: Option<&GlobalTheme>,
) -> Typography {
    let fallback = theme.and_then(|t| t.typography.as_ref());
    let pair = |f: fn(&TextSettings) -> Option<f64>| [settings.and_then(f), fallback.and_then(f)];

    let font_family = [settings, fallback]
        .into_iter()
        .flatten()
        .find_map(|s| s.font_family.as_deref().and_then(clean_font_family))
        .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string());
    let font_weight = [settings, fallback]
        .into_iter()
        .flatten()
        .find_map(|s| s.font_weight.as_deref().and_then(clean_font_weight))
        .unwrap_or_else(|| DEFAULT_FONT_WEIGHT.to_string());
    let text_align = [settings, fallback]
        .into_iter()
        .flatten()
        .find_map(|s| s.text_align)
        .unwrap_or_default();

    Typography {
        font_family,
        font_weight,
        h1_size: first_number(pair(|s| s.h1_size), DEFAULT_H1_SIZE),
        h2_size: first_number(pair(|s| s.h2_size), DEFAULT_H2_SIZE),
        body_size: first_number(pair(|s| s.body_size), DEFAULT_BODY_SIZE),
        line_height: first_number(pair(|s| s.line_height), DEFAULT_LINE_HEIGHT),
        letter_spacing: first_number(pair(|s| s.letter_spacing), DEFAULT_LETTER_SPACING),
        text_align,
    }
}

pub fn resolve_layout(settings: Option<&LayoutSettings>, avatar: Option<AvatarShape>) -> Layout {
    let spacing = settings.and_then(|s| s.spacing_preset).unwrap_or_default();
    let card_style = settings.and_then(|s| s.card_style).unwrap_or_default();
    let radius = settings
        .and_then(|s| s.border_radius_preset.or(s.border_radius))
        .unwrap_or_default();

    let (block_spacing, padding) = match spacing {
        SpacingPreset::Compact => (16, 16),
        SpacingPreset::Normal => (24, 32),
        SpacingPreset::Spacious => (32, 48),
    };

    Layout {
        block_spacing,
        padding,
        radius: match radius {
            RadiusPreset::None => "0",
            RadiusPreset::Small => "4px",
            RadiusPreset::Medium => "8px",
            RadiusPreset::Large => "12px",
        },
        shadow: match card_style {
            CardStyle::Elevated => "0 4px 6px rgba(0,0,0,0.1)",
            CardStyle::Flat => "none",
        },
        avatar_radius: match avatar.unwrap_or_default() {
            AvatarShape::Circle => "50%",
            AvatarShape::Rounded => "12px",
            AvatarShape::Square => "0",
        },
    }
}
