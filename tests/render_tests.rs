//! Render Tests
//!
//! Renderer behavior across full portfolios: determinism, contrast,
//! style fallbacks and section composition.

use chrono::{TimeZone, Utc};
use folio::model::{block_ids, EditorState, GlobalTheme, Portfolio, ThemeColors};
use folio::render::{is_light, optimal_text_color, render_markup, HexColor};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn portfolio(state: serde_json::Value) -> Portfolio {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Portfolio {
        id: "portfolio_render".into(),
        title: "Render".into(),
        created_at: at,
        updated_at: at,
        version: "1.0.1".into(),
        editor_state: serde_json::from_value(state).unwrap(),
        global_theme: None,
        pages: Vec::new(),
        blocks: Vec::new(),
        pages_count: 1,
        blocks_count: 0,
    }
}

fn full_state() -> serde_json::Value {
    json!({
        "name": "Alice",
        "profession": "Engineer",
        "description": "Builds things",
        "colorScheme": {"primary": "#112233", "background": "#000000", "backgroundType": "gradient"},
        "textSettings": {"fontFamily": "Roboto", "bodySize": "18"},
        "contacts": {"email": "a@example.com", "phone": "+1 555"},
        "socialLinks": [{"platform": "github", "url": "https://github.com/alice"}],
        "skills": ["Go", "Rust"],
        "experience": [{"position": "Dev", "company": "Acme", "period": "2020-2024", "description": "Shipped"}],
        "education": [{"institution": "MIT", "specialty": "CS", "period": "2016-2020"}],
        "certificates": [{"name": "CKA", "organization": "CNCF", "date": "2023", "link": "https://cncf.io"}],
        "languages": [{"language": "English", "level": "native"}],
        "items": [{"title": "App", "content_type": "image", "image": "app.png"}],
        "customBlocks": [{"title": "About", "description": "line1\nline2", "image": "about.png"}]
    })
}

// === Determinism ===

#[test]
fn test_identical_input_identical_output() {
    let a = portfolio(full_state());
    let b = portfolio(full_state());
    let first = render_markup(&a);
    for _ in 0..3 {
        assert_eq!(render_markup(&a), first);
    }
    assert_eq!(render_markup(&b), first);
}

#[test]
fn test_every_section_rendered_in_order() {
    let html = render_markup(&portfolio(full_state()));
    let order = [
        "hero",
        "contacts",
        "skills",
        "experience",
        "education",
        "certificates",
        "languages",
        "works",
        "custom",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|name| {
            html.find(&format!("data-section=\"{}\"", name))
                .unwrap_or_else(|| panic!("missing section {}", name))
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

// === Contrast ===

#[test_case("#000000", "#FFFFFF" ; "black background")]
#[test_case("#FFFFFF", "#000000" ; "white background")]
#[test_case("#808080", "#000000" ; "mid gray is just above half")]
#[test_case("#2563EB", "#FFFFFF" ; "default primary")]
fn test_text_color_for_background(background: &str, expected: &str) {
    assert_eq!(optimal_text_color(background), expected);
}

#[test]
fn test_exact_half_luminance_is_dark() {
    assert!(!folio::render::color::is_light_luminance(0.5));
    assert!(folio::render::color::is_light_luminance(0.5 + f64::EPSILON));
}

#[test_case("#abc", "#aabbcc")]
#[test_case("#FFF", "#ffffff")]
#[test_case("#000", "#000000")]
#[test_case("#7f7", "#77ff77")]
fn test_short_hex_matches_expansion(short: &str, long: &str) {
    assert_eq!(is_light(short), is_light(long));
    assert_eq!(
        HexColor::parse(short).unwrap().rgb(),
        HexColor::parse(long).unwrap().rgb()
    );
}

#[test]
fn test_dark_background_gets_white_text_and_dark_cards() {
    let html = render_markup(&portfolio(json!({
        "colorScheme": {"background": "#000000"},
        "skills": ["Go"]
    })));
    assert!(html.contains("background: #000000; color: #FFFFFF;"));
    assert!(html.contains("#374151"));
}

// === Fallbacks ===

#[test]
fn test_legacy_color_keys_are_used() {
    let html = render_markup(&portfolio(json!({
        "colorScheme": {"primary_color": "#aa0000", "background_color": "#111111"},
        "skills": ["Go"]
    })));
    assert!(html.contains("background: #aa0000"));
    assert!(html.contains("background: #111111; color: #FFFFFF;"));
}

#[test]
fn test_theme_is_third_tier() {
    let mut p = portfolio(json!({"skills": ["Go"]}));
    p.global_theme = Some(GlobalTheme {
        colors: Some(ThemeColors {
            primary_color: Some("#00aa00".into()),
            ..Default::default()
        }),
        ..Default::default()
    });
    assert!(render_markup(&p).contains("background: #00aa00"));

    // The editor's own key wins over the theme.
    p.editor_state.color_scheme = Some(serde_json::from_value(json!({"primary": "#0000aa"})).unwrap());
    let html = render_markup(&p);
    assert!(html.contains("background: #0000aa"));
    assert!(!html.contains("#00aa00"));
}

#[test]
fn test_malformed_colors_degrade_to_defaults() {
    let html = render_markup(&portfolio(json!({
        "colorScheme": {"primary": "blue", "background": "#12", "accent": 42},
        "skills": ["Go"]
    })));
    assert!(html.contains("background: #2563EB"));
    assert!(html.contains("background: #ffffff; color: #000000;"));
}

#[test]
fn test_unset_background_type_is_solid() {
    let html = render_markup(&portfolio(json!({"colorScheme": {"background": "#222222"}})));
    assert!(!html.contains("linear-gradient"));
}

#[test]
fn test_gradient_second_stop_defaults_to_gray() {
    let html = render_markup(&portfolio(json!({
        "colorScheme": {"background": "#ffffff", "backgroundType": "gradient"}
    })));
    assert!(html.contains("linear-gradient(135deg, #ffffff 0%, #f3f4f6 100%)"));
}

// === Sections ===

#[test]
fn test_empty_collections_render_nothing() {
    let html = render_markup(&portfolio(json!({
        "skills": [],
        "experience": [],
        "items": [],
        "customBlocks": [{}]
    })));
    for name in ["skills", "experience", "works", "custom"] {
        assert!(!html.contains(&format!("data-section=\"{}\"", name)));
    }
}

#[test]
fn test_visibility_hides_nonempty_sections() {
    let mut p = portfolio(full_state());
    for id in [block_ids::EXPERIENCE, block_ids::CUSTOM] {
        p.editor_state.set_block_visible(id, false);
    }
    let html = render_markup(&p);
    assert!(!html.contains("data-section=\"experience\""));
    assert!(!html.contains("data-section=\"custom\""));
    assert!(html.contains("data-section=\"education\""));
}

#[test]
fn test_custom_block_default_ratio() {
    let html = render_markup(&portfolio(full_state()));
    assert!(html.contains("grid-template-columns: 45% 55%;"));
    assert!(html.contains("line1<br>line2"));
}

#[test]
fn test_user_text_is_escaped() {
    let html = render_markup(&portfolio(json!({
        "name": "<script>alert(1)</script>",
        "socialLinks": [{"platform": "x", "url": "javascript:alert(1)"}]
    })));
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("javascript:"));
}

#[test]
fn test_default_name_when_blank() {
    let mut p = portfolio(json!({"name": "  "}));
    p.title = String::new();
    assert!(render_markup(&p).contains("My portfolio"));
}

#[test]
fn test_missing_everything_never_panics() {
    let p = portfolio(json!({}));
    let html = render_markup(&p);
    assert!(html.starts_with("<div class=\"portfolio-root"));
    assert_eq!(EditorState::default(), p.editor_state);
}
