//! Portfolio Renderer
//!
//! Turns a [`Portfolio`] into self-styled markup. The same function feeds
//! the live preview, the flat export and the paginated export, so its
//! output must depend on nothing but the portfolio itself.

pub mod color;
pub mod markup;
pub mod resolve;
pub mod sections;

pub use color::{is_light, optimal_text_color, HexColor};
pub use resolve::{resolve_style, BackgroundMode, Palette, ResolvedStyle, Typography};

use crate::model::{block_ids, Portfolio};
use markup::MarkupWriter;
use sections::SectionContext;

/// Render a portfolio to markup.
///
/// Pure and deterministic: identical input always yields identical bytes.
/// Missing or malformed fields degrade to defaults and never fail.
pub fn render_markup(portfolio: &Portfolio) -> String {
    let style = ResolvedStyle::for_portfolio(portfolio);
    render_with_style(portfolio, &style)
}

/// Render with an already resolved style.
pub fn render_with_style(portfolio: &Portfolio, style: &ResolvedStyle) -> String {
    let state = &portfolio.editor_state;
    let ctx = SectionContext::new(style);
    let builders: [(&str, &dyn Fn() -> Option<String>); 9] = [
        (block_ids::HERO, &|| sections::hero(&ctx, state, &portfolio.title)),
        (block_ids::CONTACTS, &|| {
            sections::contacts(&ctx, state.contacts.as_ref(), &state.social_links)
        }),
        (block_ids::SKILLS, &|| sections::skills(&ctx, &state.skills)),
        (block_ids::EXPERIENCE, &|| sections::experience(&ctx, &state.experience)),
        (block_ids::EDUCATION, &|| sections::education(&ctx, &state.education)),
        (block_ids::CERTIFICATES, &|| sections::certificates(&ctx, &state.certificates)),
        (block_ids::LANGUAGES, &|| sections::languages(&ctx, &state.languages)),
        (block_ids::WORKS, &|| sections::works(&ctx, &state.items)),
        (block_ids::CUSTOM, &|| sections::custom_blocks(&ctx, &state.custom_blocks)),
    ];

    let p = &style.palette;
    let l = &style.layout;
    let root_style = format!(
        "background: {}; color: {}; padding: {}px; border-radius: {}; box-shadow: {}; max-width: 1200px; margin: 0 auto; width: 100%; box-sizing: border-box; word-wrap: break-word; overflow-wrap: break-word; overflow-x: hidden;",
        p.page_background(),
        p.text,
        l.padding,
        l.radius,
        l.shadow
    );

    let mut w = MarkupWriter::new();
    w.open(
        "div",
        &[("class", "portfolio-root rounded-lg"), ("style", &root_style)],
    );
    for (id, build) in builders {
        if !state.is_block_visible(id) {
            tracing::trace!(block = id, "hidden");
            continue;
        }
        if let Some(section) = build() {
            w.raw(section);
        }
    }
    w.close("div");
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColorScheme, EditorState};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn portfolio(state: EditorState) -> Portfolio {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Portfolio {
            id: "portfolio_test".into(),
            title: "Test".into(),
            created_at: at,
            updated_at: at,
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
    fn test_render_is_deterministic() {
        let state: EditorState = serde_json::from_value(serde_json::json!({
            "name": "Alice",
            "skills": ["Go", "Rust"],
            "experience": [{"position": "Dev", "company": "Acme"}],
            "customBlocks": [{"title": "Hi", "image": "x.png"}]
        }))
        .unwrap();
        let p = portfolio(state);
        assert_eq!(render_markup(&p), render_markup(&p));
    }

    #[test]
    fn test_sections_in_order() {
        let state: EditorState = serde_json::from_value(serde_json::json!({
            "skills": ["Go"],
            "languages": [{"language": "English", "level": "native"}],
            "contacts": {"email": "a@b.c"}
        }))
        .unwrap();
        let html = render_markup(&portfolio(state));
        let hero = html.find("data-section=\"hero\"").unwrap();
        let contacts = html.find("data-section=\"contacts\"").unwrap();
        let skills = html.find("data-section=\"skills\"").unwrap();
        let languages = html.find("data-section=\"languages\"").unwrap();
        assert!(hero < contacts && contacts < skills && skills < languages);
        assert!(!html.contains("data-section=\"experience\""));
    }

    #[test]
    fn test_hidden_block_is_skipped() {
        let mut state = EditorState {
            skills: vec!["Go".into()],
            ..Default::default()
        };
        state.set_block_visible(block_ids::SKILLS, false);
        state.set_block_visible(block_ids::HERO, false);
        let html = render_markup(&portfolio(state));
        assert!(!html.contains("data-section=\"skills\""));
        assert!(!html.contains("data-section=\"hero\""));
    }

    #[test]
    fn test_gradient_background() {
        let state = EditorState {
            color_scheme: Some(ColorScheme {
                background: Some("#101010".into()),
                background2: Some("#202020".into()),
                background_type: Some("gradient".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let html = render_markup(&portfolio(state));
        assert!(html.contains("background: linear-gradient(135deg, #101010 0%, #202020 100%); color: #FFFFFF;"));
    }

    #[test]
    fn test_explicit_empty_background_type_is_not_gradient() {
        let state = EditorState {
            color_scheme: Some(ColorScheme {
                background_type: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let html = render_markup(&portfolio(state));
        assert!(!html.contains("linear-gradient"));
        assert!(html.contains("background: #ffffff; color: #000000;"));
    }
}
