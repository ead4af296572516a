//! Color parsing and contrast selection.
//!
//! Luminance is `(0.299r + 0.587g + 0.114b) / 255`. A color is light when
//! its luminance is strictly greater than 0.5, so a luminance of exactly
//! 0.5 is dark and gets white text.

use std::fmt;

/// Text color used on light backgrounds.
pub const TEXT_ON_LIGHT: &str = "#000000";

/// Text color used on dark backgrounds.
pub const TEXT_ON_DARK: &str = "#FFFFFF";

/// Threshold above which a luminance counts as light.
pub const LIGHT_THRESHOLD: f64 = 0.5;

/// A validated hex color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexColor {
    /// Text as it will be written into markup, always `#`-prefixed.
    text: String,
    r: u8,
    g: u8,
    b: u8,
}

impl HexColor {
    /// Parse `#rgb`, `#rrggbb`, or either without the leading `#`.
    /// Surrounding whitespace is ignored. Anything else is `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        Some(Self {
            text: format!("#{}", digits),
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn luminance(&self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            / 255.0
    }

    pub fn is_light(&self) -> bool {
        is_light_luminance(self.luminance())
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Strict `>` comparison against [`LIGHT_THRESHOLD`].
pub fn is_light_luminance(luminance: f64) -> bool {
    luminance > LIGHT_THRESHOLD
}

/// Whether a color string is light. Malformed input counts as light.
pub fn is_light(color: &str) -> bool {
    HexColor::parse(color).map_or(true, |c| c.is_light())
}

/// Black for light backgrounds, white for dark ones. Malformed input gets
/// black text.
pub fn optimal_text_color(background: &str) -> &'static str {
    if is_light(background) {
        TEXT_ON_LIGHT
    } else {
        TEXT_ON_DARK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test_case("#000000", TEXT_ON_DARK ; "black")]
    #[test_case("#FFFFFF", TEXT_ON_LIGHT ; "white")]
    #[test_case("#ffffff", TEXT_ON_LIGHT ; "lowercase white")]
    #[test_case("#808080", TEXT_ON_LIGHT ; "mid gray is just above threshold")]
    #[test_case("#7f7f7f", TEXT_ON_DARK ; "one step darker")]
    #[test_case("#2563EB", TEXT_ON_DARK ; "default primary")]
    #[test_case("not-a-color", TEXT_ON_LIGHT ; "malformed")]
    #[test_case("", TEXT_ON_LIGHT ; "empty")]
    fn test_optimal_text_color(bg: &str, expected: &str) {
        assert_eq!(optimal_text_color(bg), expected);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!is_light_luminance(0.5));
        assert!(is_light_luminance(0.5 + f64::EPSILON));
        assert!(!is_light_luminance(0.0));
    }

    #[test]
    fn test_mid_gray_luminance() {
        let gray = HexColor::parse("#808080").unwrap();
        assert_relative_eq!(gray.luminance(), 128.0 / 255.0, epsilon = 1e-9);
    }

    #[test_case("#abc", "#aabbcc")]
    #[test_case("#fff", "#ffffff")]
    #[test_case("#000", "#000000")]
    #[test_case("#888", "#888888")]
    fn test_short_hex_matches_expansion(short: &str, long: &str) {
        let a = HexColor::parse(short).unwrap();
        let b = HexColor::parse(long).unwrap();
        assert_eq!(a.rgb(), b.rgb());
        assert_eq!(a.is_light(), b.is_light());
        assert_eq!(optimal_text_color(short), optimal_text_color(long));
    }

    #[test]
    fn test_parse_without_hash() {
        let c = HexColor::parse(" ff0000 ").unwrap();
        assert_eq!(c.as_str(), "#ff0000");
        assert_eq!(c.rgb(), (255, 0, 0));
    }

    #[test_case("#12345" ; "five digits")]
    #[test_case("#ggg" ; "non hex")]
    #[test_case("rgb(0,0,0)" ; "functional notation")]
    fn test_parse_rejects(input: &str) {
        assert!(HexColor::parse(input).is_none());
    }
}
