//! Section builders.
//!
//! Each builder returns `None` when its section has nothing to show, so the
//! caller never emits an empty shell. Styles are inline so the markup looks
//! the same wherever it is embedded.

use crate::model::{
    Certificate, Contacts, ContentType, CustomBlock, Education, EditorState, Experience,
    Language, PortfolioItem, SocialLink, TextAlign,
};
use crate::render::color::{optimal_text_color, HexColor};
use crate::render::markup::{
    escape_attr, escape_multiline, escape_text, num, present, safe_url, MarkupWriter,
};
use crate::render::resolve::ResolvedStyle;

pub const LABEL_CONTACTS: &str = "Contacts";
pub const LABEL_SKILLS: &str = "Skills";
pub const LABEL_EXPERIENCE: &str = "Experience";
pub const LABEL_EDUCATION: &str = "Education";
pub const LABEL_CERTIFICATES: &str = "Certificates";
pub const LABEL_LANGUAGES: &str = "Languages";
pub const LABEL_WORKS: &str = "My work";

/// Shown when neither the editor name nor the portfolio title is set.
pub const DEFAULT_NAME: &str = "My portfolio";

const DEFAULT_IMAGE_RATIO: f64 = 55.0;
const DEFAULT_TITLE_FONT_SIZE: f64 = 24.0;
const DEFAULT_BLOCK_PADDING: f64 = 12.0;

const CHIP_SHADOW: &str = "0 2px 4px rgba(0,0,0,0.1)";
const ENTRY_SHADOW: &str = "0 2px 4px rgba(0,0,0,0.05)";

/// Precomputed style fragments shared by all sections of one render.
pub struct SectionContext<'a> {
    style: &'a ResolvedStyle,
    font: String,
    metrics: String,
}

impl<'a> SectionContext<'a> {
    pub fn new(style: &'a ResolvedStyle) -> Self {
        let t = &style.typography;
        Self {
            style,
            font: format!("font-family: '{}', sans-serif;", escape_attr(&t.font_family)),
            metrics: format!(
                "line-height: {}; letter-spacing: {}px;",
                num(t.line_height),
                num(t.letter_spacing)
            ),
        }
    }

    fn body(&self) -> String {
        num(self.style.typography.body_size)
    }

    fn body_scaled(&self, factor: f64) -> String {
        num(self.style.typography.body_size * factor)
    }

    fn weight(&self) -> &str {
        &self.style.typography.font_weight
    }

    /// Root style of a card section.
    fn card(&self) -> String {
        let p = &self.style.palette;
        let l = &self.style.layout;
        format!(
            "margin-bottom: {}px; padding: 24px; background: {}; border-radius: {}; box-shadow: {};",
            l.block_spacing, p.card_background, l.radius, l.shadow
        )
    }

    fn open_card(&self, w: &mut MarkupWriter, name: &str, extra: &str) {
        let style = if extra.is_empty() {
            self.card()
        } else {
            format!("{} {}", self.card(), extra)
        };
        w.open("div", &[("data-section", name), ("style", &style)]);
    }

    fn heading(&self, w: &mut MarkupWriter, label: &str, margin_bottom: u32) {
        w.line(format!(
            "<h2 style=\"font-size: {}px; {} font-weight: {}; margin-bottom: {}px; color: {}; {}\">{}</h2>",
            num(self.style.typography.h2_size),
            self.font,
            self.weight(),
            margin_bottom,
            self.style.palette.primary,
            self.metrics,
            escape_text(label)
        ));
    }

    /// Pill used for skills and languages.
    fn chip(&self, text: &str) -> String {
        let p = &self.style.palette;
        format!(
            "<span style=\"padding: 10px 18px; background: {}; color: white; border-radius: {}; font-size: {}px; {} font-weight: {}; box-shadow: {}; {}\">{}</span>",
            p.primary,
            self.style.layout.radius,
            self.body(),
            self.font,
            self.weight(),
            CHIP_SHADOW,
            self.metrics,
            escape_text(text)
        )
    }

    fn link_style(&self) -> String {
        let accent = &self.style.palette.accent;
        format!(
            "color: {}; text-decoration: none; border-bottom: 1px solid {};",
            accent, accent
        )
    }

    /// Card-level paragraph for contact lines.
    fn contact_line(&self, inner: &str) -> String {
        format!(
            "<p style=\"font-size: {}px; {} margin: 8px 0; color: {}; {}\">{}</p>",
            self.body(),
            self.font,
            self.style.palette.card_text,
            self.metrics,
            inner
        )
    }

    /// Nested entry used by experience, education and certificates.
    fn entry(&self, w: &mut MarkupWriter, title: &str, subtitle: &str, tail: Option<String>) {
        let p = &self.style.palette;
        let l = &self.style.layout;
        w.line(format!(
            "<div style=\"margin-bottom: 20px; padding: 20px; background: {}; border-left: 4px solid {}; border-radius: {}; box-shadow: {};\">",
            p.nested_background, p.primary, l.radius, ENTRY_SHADOW
        ));
        w.line(format!(
            "<h3 style=\"font-size: {}px; {} font-weight: {}; margin-bottom: 8px; color: {}; {}\">{}</h3>",
            num(self.style.typography.h2_size * 0.95),
            self.font,
            self.weight(),
            p.primary,
            self.metrics,
            escape_text(title)
        ));
        w.line(format!(
            "<p style=\"font-size: {}px; {} margin: 6px 0; color: {}; font-weight: {}; opacity: 0.8; {}\">{}</p>",
            self.body(),
            self.font,
            p.nested_text,
            self.weight(),
            self.metrics,
            subtitle
        ));
        if let Some(tail) = tail {
            w.line(tail);
        }
        w.line("</div>");
    }

    fn entry_description(&self, text: &str) -> String {
        format!(
            "<p style=\"font-size: {}px; {} margin-top: 12px; color: {}; {}\">{}</p>",
            self.body(),
            self.font,
            self.style.palette.nested_text,
            self.metrics,
            escape_multiline(text)
        )
    }
}

/// `"<left> • <right>"`, or whichever side is present.
fn joined(left: &str, right: &str) -> String {
    match (present(Some(left)), present(Some(right))) {
        (Some(l), Some(r)) => format!("{} • {}", escape_text(l), escape_text(r)),
        (Some(l), None) => escape_text(l),
        (None, Some(r)) => format!("• {}", escape_text(r)),
        (None, None) => String::new(),
    }
}

fn avatar_margins(align: TextAlign) -> (&'static str, &'static str) {
    match align {
        TextAlign::Center => ("margin-left: auto; margin-right: auto;", "0 auto 20px"),
        TextAlign::Right => ("margin-left: auto; margin-right: 0;", "0 0 20px auto"),
        TextAlign::Left => ("margin-left: 0; margin-right: auto;", "0 0 20px 0"),
    }
}

pub fn hero(ctx: &SectionContext<'_>, state: &EditorState, title: &str) -> Option<String> {
    let p = &ctx.style.palette;
    let l = &ctx.style.layout;
    let t = &ctx.style.typography;
    let align = t.text_align;

    let name = present(state.name.as_deref())
        .or_else(|| present(Some(title)))
        .unwrap_or(DEFAULT_NAME);
    let avatar = present(state.avatar.as_deref()).or_else(|| present(state.avatar_src.as_deref()));

    let mut w = MarkupWriter::new();
    w.open(
        "div",
        &[
            ("data-section", "hero"),
            (
                "style",
                &format!(
                    "text-align: {}; margin-bottom: {}px; padding: 40px 24px; background: {}; border-radius: {}; box-shadow: {};",
                    align.as_str(),
                    l.block_spacing,
                    p.card_background,
                    l.radius,
                    l.shadow
                ),
            ),
        ],
    );

    let (img_margins, disc_margin) = avatar_margins(align);
    match avatar {
        Some(src) => w.line(format!(
            "<img src=\"{}\" alt=\"Avatar\" style=\"width: 140px; height: 140px; border-radius: {}; object-fit: cover; object-position: center; border: 4px solid {}; margin-bottom: 20px; display: block; {} box-shadow: {}; vertical-align: middle;\">",
            safe_url(src),
            l.avatar_radius,
            p.primary,
            img_margins,
            l.shadow
        )),
        None => w.line(format!(
            "<div data-avatar-placeholder style=\"width: 140px; height: 140px; border-radius: {}; background: {}; margin: {}; box-shadow: {};\"></div>",
            l.avatar_radius, p.primary, disc_margin, l.shadow
        )),
    };

    w.line(format!(
        "<h1 style=\"font-size: {}px; {} font-weight: {}; margin-bottom: 12px; color: {}; {} word-wrap: break-word; overflow-wrap: break-word; max-width: 100%;\">{}</h1>",
        num(t.h1_size),
        ctx.font,
        ctx.weight(),
        p.primary,
        ctx.metrics,
        escape_text(name)
    ));

    if let Some(profession) = present(state.profession.as_deref()) {
        w.line(format!(
            "<p style=\"font-size: {}px; {} margin-top: 8px; margin-bottom: 16px; color: {}; font-weight: {}; opacity: 0.8; {} word-wrap: break-word; overflow-wrap: break-word; max-width: 100%;\">{}</p>",
            num(t.h2_size),
            ctx.font,
            p.card_text,
            ctx.weight(),
            ctx.metrics,
            escape_text(profession)
        ));
    }

    if let Some(description) = present(state.description.as_deref()) {
        let centered = if align == TextAlign::Center {
            " max-width: 700px; margin-left: auto; margin-right: auto;"
        } else {
            ""
        };
        w.line(format!(
            "<p style=\"font-size: {}px; {} margin-top: 12px;{} color: {}; {} opacity: 0.9; word-wrap: break-word; overflow-wrap: break-word;\">{}</p>",
            ctx.body(),
            ctx.font,
            centered,
            p.card_text,
            ctx.metrics,
            escape_multiline(description)
        ));
    }

    w.close("div");
    Some(w.finish())
}

pub fn contacts(
    ctx: &SectionContext<'_>,
    contacts: Option<&Contacts>,
    links: &[SocialLink],
) -> Option<String> {
    let field = |f: fn(&Contacts) -> &Option<String>| contacts.and_then(|c| present(f(c).as_deref()));
    let phone = field(|c| &c.phone);
    let email = field(|c| &c.email);
    let website = field(|c| &c.website);
    let location = field(|c| &c.location);
    let links: Vec<&SocialLink> = links
        .iter()
        .filter(|l| !l.url.trim().is_empty() || !l.platform.trim().is_empty())
        .collect();

    if phone.is_none() && email.is_none() && website.is_none() && location.is_none() && links.is_empty() {
        return None;
    }

    let mut w = MarkupWriter::new();
    ctx.open_card(&mut w, "contacts", "");
    ctx.heading(&mut w, LABEL_CONTACTS, 16);

    if let Some(phone) = phone {
        w.line(ctx.contact_line(&format!("📞 {}", escape_text(phone))));
    }
    if let Some(email) = email {
        w.line(ctx.contact_line(&format!("📧 {}", escape_text(email))));
    }
    if let Some(website) = website {
        w.line(ctx.contact_line(&format!(
            "🌐 <a href=\"{}\" target=\"_blank\" style=\"{}\">{}</a>",
            safe_url(website),
            ctx.link_style(),
            escape_text(website)
        )));
    }
    if let Some(location) = location {
        w.line(ctx.contact_line(&format!("📍 {}", escape_text(location))));
    }

    if !links.is_empty() {
        w.raw("<div style=\"margin-top: 12px; display: flex; flex-wrap: wrap; gap: 8px;\">");
        for link in links {
            w.raw(format!(
                "<a href=\"{}\" target=\"_blank\" style=\"padding: 6px 12px; background: {}; color: white; border-radius: 6px; text-decoration: none; font-size: {}px; {}\">{}</a>",
                safe_url(&link.url),
                ctx.style.palette.accent,
                ctx.body_scaled(0.9),
                ctx.font,
                escape_text(&link.platform)
            ));
        }
        w.line("</div>");
    }

    w.close("div");
    Some(w.finish())
}

pub fn skills(ctx: &SectionContext<'_>, skills: &[String]) -> Option<String> {
    let skills: Vec<&str> = skills.iter().filter_map(|s| present(Some(s))).collect();
    if skills.is_empty() {
        return None;
    }

    let mut w = MarkupWriter::new();
    ctx.open_card(&mut w, "skills", &format!("color: {};", ctx.style.palette.card_text));
    ctx.heading(&mut w, LABEL_SKILLS, 16);
    w.raw("<div style=\"display: flex; flex-wrap: wrap; gap: 10px;\">");
    for skill in skills {
        w.raw(ctx.chip(skill));
    }
    w.line("</div>");
    w.close("div");
    Some(w.finish())
}

pub fn experience(ctx: &SectionContext<'_>, entries: &[Experience]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let mut w = MarkupWriter::new();
    ctx.open_card(&mut w, "experience", "");
    ctx.heading(&mut w, LABEL_EXPERIENCE, 20);
    for exp in entries {
        let title = present(Some(&exp.position)).unwrap_or("Position");
        let tail = present(Some(&exp.description)).map(|d| ctx.entry_description(d));
        ctx.entry(&mut w, title, &joined(&exp.company, &exp.period), tail);
    }
    w.close("div");
    Some(w.finish())
}

pub fn education(ctx: &SectionContext<'_>, entries: &[Education]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let mut w = MarkupWriter::new();
    ctx.open_card(&mut w, "education", "");
    ctx.heading(&mut w, LABEL_EDUCATION, 20);
    for edu in entries {
        let title = present(Some(&edu.institution)).unwrap_or("Institution");
        let tail = present(Some(&edu.description)).map(|d| ctx.entry_description(d));
        ctx.entry(&mut w, title, &joined(&edu.specialty, &edu.period), tail);
    }
    w.close("div");
    Some(w.finish())
}

pub fn certificates(ctx: &SectionContext<'_>, entries: &[Certificate]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let mut w = MarkupWriter::new();
    ctx.open_card(&mut w, "certificates", "");
    ctx.heading(&mut w, LABEL_CERTIFICATES, 20);
    for cert in entries {
        let title = present(Some(&cert.name)).unwrap_or("Certificate");
        let tail = present(Some(&cert.link)).map(|link| {
            format!(
                "<p style=\"font-size: {}px; {} margin-top: 8px;\"><a href=\"{}\" target=\"_blank\" style=\"{}\">🔗 View certificate</a></p>",
                ctx.body(),
                ctx.font,
                safe_url(link),
                ctx.link_style()
            )
        });
        ctx.entry(&mut w, title, &joined(&cert.organization, &cert.date), tail);
    }
    w.close("div");
    Some(w.finish())
}

pub fn languages(ctx: &SectionContext<'_>, entries: &[Language]) -> Option<String> {
    let entries: Vec<&Language> = entries
        .iter()
        .filter(|l| !l.language.trim().is_empty())
        .collect();
    if entries.is_empty() {
        return None;
    }

    let mut w = MarkupWriter::new();
    ctx.open_card(&mut w, "languages", "");
    ctx.heading(&mut w, LABEL_LANGUAGES, 16);
    w.raw("<div style=\"display: flex; flex-wrap: wrap; gap: 10px;\">");
    for lang in entries {
        w.raw(ctx.chip(&format!("{} ({})", lang.language.trim(), lang.level.label())));
    }
    w.line("</div>");
    w.close("div");
    Some(w.finish())
}

/// What a work item shows next to its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkAsset<'a> {
    Image(&'a str),
    VideoPlaceholder,
    LinkPlaceholder,
    None,
}

/// Asset precedence: image, then first gallery image, then a video
/// placeholder, then a link placeholder.
pub fn work_asset(item: &PortfolioItem) -> WorkAsset<'_> {
    let data = item.content_data.as_ref();
    let url = data.and_then(|d| present(d.url.as_deref()));

    match item.content_type {
        ContentType::Image => present(item.image.as_deref())
            .map(WorkAsset::Image)
            .unwrap_or(WorkAsset::None),
        ContentType::Gallery => data
            .and_then(|d| d.images.iter().find_map(|src| present(Some(src))))
            .map(WorkAsset::Image)
            .unwrap_or(WorkAsset::None),
        ContentType::Video if url.is_some() => WorkAsset::VideoPlaceholder,
        ContentType::Link if url.is_some() => WorkAsset::LinkPlaceholder,
        _ => WorkAsset::None,
    }
}

fn work_item(ctx: &SectionContext<'_>, w: &mut MarkupWriter, item: &PortfolioItem) {
    let p = &ctx.style.palette;
    let l = &ctx.style.layout;
    let t = &ctx.style.typography;
    let url = item
        .content_data
        .as_ref()
        .and_then(|d| present(d.url.as_deref()));

    w.line(format!(
        "<div data-work-item style=\"display: flex; gap: 24px; background: {}; border-radius: {}; padding: 32px; box-shadow: {}; align-items: center;\">",
        p.nested_background, l.radius, l.shadow
    ));

    w.line("<div style=\"flex: 1; padding-right: 24px;\">");
    w.line(format!(
        "<h3 style=\"font-weight: {}; font-size: {}px; {} margin-bottom: 12px; color: {}; {}\">{}</h3>",
        ctx.weight(),
        num(t.h2_size * 1.1),
        ctx.font,
        p.primary,
        ctx.metrics,
        escape_text(&item.title)
    ));
    if let Some(description) = present(item.description.as_deref()) {
        w.line(format!(
            "<p style=\"font-size: {}px; {} color: {}; {} margin-bottom: 16px; opacity: 0.9;\">{}</p>",
            ctx.body(),
            ctx.font,
            p.nested_text,
            ctx.metrics,
            escape_multiline(description)
        ));
    }
    if let (ContentType::Link, Some(url)) = (item.content_type, url) {
        w.line(format!(
            "<a href=\"{}\" target=\"_blank\" style=\"display: inline-block; padding: 10px 20px; background: {}; color: white; border-radius: 6px; text-decoration: none; font-size: {}px; {} font-weight: {}; margin-top: 8px;\">🔗 Live view</a>",
            safe_url(url),
            p.accent,
            ctx.body_scaled(0.9),
            ctx.font,
            ctx.weight()
        ));
    }
    if let Some(category) = present(item.category.as_deref()) {
        w.line(format!(
            "<span style=\"font-size: {}px; padding: 6px 12px; background: {}; color: white; border-radius: 6px; margin-top: 12px; display: inline-block; font-weight: {}; {}\">{}</span>",
            ctx.body_scaled(0.875),
            p.primary,
            ctx.weight(),
            ctx.metrics,
            escape_text(category)
        ));
    }
    let tags: Vec<&str> = item.tags.iter().filter_map(|tag| present(Some(tag))).collect();
    if !tags.is_empty() {
        w.raw("<div style=\"margin-top: 12px; display: flex; flex-wrap: wrap; gap: 6px;\">");
        for tag in tags {
            w.raw(format!(
                "<span style=\"font-size: {}px; padding: 4px 10px; background: {}; color: {}; border-radius: 6px; border: 1px solid {};\">#{}</span>",
                ctx.body_scaled(0.8),
                p.card_background,
                p.accent,
                p.accent,
                escape_text(tag)
            ));
        }
        w.line("</div>");
    }
    w.line("</div>");

    let placeholder = |icon: &str, label: &str, border: &str| {
        format!(
            "<div style=\"flex: 0 0 40%; min-width: 300px; height: 280px; background: {}; border-radius: {}; display: flex; align-items: center; justify-content: center; color: {}; border: 2px {} {};\"><div style=\"text-align: center;\"><div style=\"font-size: 48px; margin-bottom: 8px;\">{}</div><div style=\"font-size: {}px; {}\">{}</div></div></div>",
            p.card_background,
            l.radius,
            p.accent,
            border,
            p.accent,
            icon,
            ctx.body(),
            ctx.font,
            label
        )
    };

    match work_asset(item) {
        WorkAsset::Image(src) => {
            w.line(format!(
                "<div style=\"flex: 0 0 40%; min-width: 300px; display: flex; align-items: center; justify-content: center;\"><img src=\"{}\" alt=\"{}\" style=\"width: 100%; height: 280px; object-fit: cover; object-position: center; border-radius: {}; box-shadow: {}; display: block; vertical-align: middle;\"></div>",
                safe_url(src),
                escape_attr(&item.title),
                l.radius,
                l.shadow
            ));
        }
        WorkAsset::VideoPlaceholder => {
            w.line(placeholder("▶️", "Video", "dashed"));
        }
        WorkAsset::LinkPlaceholder => {
            w.line(placeholder("🔗", "Link", "solid"));
        }
        WorkAsset::None => {}
    }

    w.line("</div>");
}

pub fn works(ctx: &SectionContext<'_>, items: &[PortfolioItem]) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    let mut w = MarkupWriter::new();
    ctx.open_card(&mut w, "works", "");
    ctx.heading(&mut w, LABEL_WORKS, 24);
    w.line(format!(
        "<div style=\"display: flex; flex-direction: column; gap: {}px;\">",
        ctx.style.layout.block_spacing
    ));
    for item in items {
        work_item(ctx, &mut w, item);
    }
    w.line("</div>");
    w.close("div");
    Some(w.finish())
}

/// Positive value or the default; the editor stores 0 for "unset".
fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

/// Image column share in percent, always within (0, 100).
pub fn image_ratio(block: &CustomBlock) -> f64 {
    block
        .image_size_ratio
        .filter(|v| v.is_finite() && *v > 0.0 && *v < 100.0)
        .unwrap_or(DEFAULT_IMAGE_RATIO)
}

fn custom_block(ctx: &SectionContext<'_>, block: &CustomBlock) -> Option<String> {
    let title = present(block.title.as_deref());
    let description = present(block.description.as_deref());
    let image = present(block.image.as_deref());
    if title.is_none() && description.is_none() && image.is_none() {
        return None;
    }

    let p = &ctx.style.palette;
    let l = &ctx.style.layout;
    let t = &ctx.style.typography;

    let background = block
        .background_color
        .as_deref()
        .and_then(HexColor::parse)
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|| p.card_background.clone());
    let text_color = optimal_text_color(&background);
    let padding = positive_or(block.block_padding, DEFAULT_BLOCK_PADDING);
    let title_size = positive_or(block.title_font_size, DEFAULT_TITLE_FONT_SIZE);

    let mut text = MarkupWriter::new();
    text.line("<div class=\"custom-block-text-area\" style=\"display: flex; flex-direction: column; justify-content: flex-start; padding-right: 24px;\">");
    if let Some(title) = title {
        text.line(format!(
            "<h2 class=\"custom-block-title\" style=\"font-size: {}px; {} font-weight: {}; margin-bottom: 12px; color: {}; line-height: 1.3; letter-spacing: {}px; text-align: left; word-wrap: break-word; overflow-wrap: break-word;\">{}</h2>",
            num(title_size),
            ctx.font,
            ctx.weight(),
            p.primary,
            num(t.letter_spacing),
            escape_text(title)
        ));
    }
    if let Some(description) = description {
        text.line(format!(
            "<div style=\"font-size: {}px; {} color: {}; {} opacity: 0.9; word-wrap: break-word; overflow-wrap: break-word; text-align: left;\">{}</div>",
            ctx.body(),
            ctx.font,
            text_color,
            ctx.metrics,
            escape_multiline(description)
        ));
    }
    text.line("</div>");
    let text = text.finish();

    let mut w = MarkupWriter::new();
    w.open(
        "div",
        &[
            ("data-section", "custom"),
            ("class", "custom-block-container"),
            ("style", &format!("margin-bottom: {}px; width: 100%;", l.block_spacing)),
        ],
    );
    w.line(format!(
        "<div style=\"background: {}; border-radius: {}; box-shadow: {}; padding: {}px; overflow: hidden;\">",
        background,
        l.radius,
        l.shadow,
        num(padding)
    ));

    match image {
        Some(src) => {
            let ratio = image_ratio(block);
            w.line(format!(
                "<div class=\"custom-block-grid\" style=\"display: grid; grid-template-columns: {}% {}%; gap: 24px; align-items: start;\">",
                num(100.0 - ratio),
                num(ratio)
            ));
            w.raw(&text);
            w.line(format!(
                "<div class=\"custom-block-image-area\" style=\"overflow: hidden; border-radius: {};\"><img src=\"{}\" alt=\"{}\" style=\"width: 100%; height: auto; max-height: 180px; object-fit: cover; object-position: center; display: block;\"></div>",
                l.radius,
                safe_url(src),
                escape_attr(title.unwrap_or(""))
            ));
            w.line("</div>");
        }
        None => {
            w.line("<div style=\"padding: 16px;\">");
            w.raw(&text);
            w.line("</div>");
        }
    }

    w.line("</div>");
    w.close("div");
    Some(w.finish())
}

pub fn custom_blocks(ctx: &SectionContext<'_>, blocks: &[CustomBlock]) -> Option<String> {
    let rendered: Vec<String> = blocks
        .iter()
        .filter_map(|block| custom_block(ctx, block))
        .collect();
    (!rendered.is_empty()).then(|| rendered.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentData, LanguageLevel};
    use crate::render::resolve::resolve_style;

    fn style() -> ResolvedStyle {
        resolve_style(&EditorState::default(), None)
    }

    fn item(content_type: ContentType) -> PortfolioItem {
        PortfolioItem {
            title: "Work".into(),
            content_type,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_collections_render_nothing() {
        let style = style();
        let ctx = SectionContext::new(&style);
        assert!(skills(&ctx, &[]).is_none());
        assert!(skills(&ctx, &["  ".to_string()]).is_none());
        assert!(experience(&ctx, &[]).is_none());
        assert!(education(&ctx, &[]).is_none());
        assert!(certificates(&ctx, &[]).is_none());
        assert!(languages(&ctx, &[]).is_none());
        assert!(works(&ctx, &[]).is_none());
        assert!(custom_blocks(&ctx, &[CustomBlock::default()]).is_none());
        assert!(contacts(&ctx, Some(&Contacts::default()), &[]).is_none());
    }

    #[test]
    fn test_skill_chips() {
        let style = style();
        let ctx = SectionContext::new(&style);
        let html = skills(&ctx, &["Go".to_string(), "<Rust>".to_string()]).unwrap();
        assert!(html.starts_with("<div data-section=\"skills\""));
        assert!(html.contains(">Go</span>"));
        assert!(html.contains(">&lt;Rust&gt;</span>"));
        assert_eq!(html.matches("<span").count(), 2);
    }

    #[test]
    fn test_hero_name_fallbacks() {
        let style = style();
        let ctx = SectionContext::new(&style);
        let state = EditorState::default();
        assert!(hero(&ctx, &state, "Title").unwrap().contains(">Title</h1>"));
        assert!(hero(&ctx, &state, " ").unwrap().contains(">My portfolio</h1>"));

        let named = EditorState {
            name: Some("Alice".into()),
            ..Default::default()
        };
        assert!(hero(&ctx, &named, "Title").unwrap().contains(">Alice</h1>"));
    }

    #[test]
    fn test_hero_avatar_placeholder_uses_primary() {
        let style = style();
        let ctx = SectionContext::new(&style);
        let html = hero(&ctx, &EditorState::default(), "x").unwrap();
        assert!(html.contains("data-avatar-placeholder"));
        assert!(html.contains("background: #2563EB"));

        let with_avatar = EditorState {
            avatar_src: Some("me.png".into()),
            ..Default::default()
        };
        let html = hero(&ctx, &with_avatar, "x").unwrap();
        assert!(html.contains("<img src=\"me.png\""));
    }

    #[test]
    fn test_work_asset_precedence() {
        let mut image = item(ContentType::Image);
        image.image = Some("a.png".into());
        assert_eq!(work_asset(&image), WorkAsset::Image("a.png"));

        let mut gallery = item(ContentType::Gallery);
        gallery.content_data = Some(ContentData {
            images: vec!["".into(), "g1.png".into(), "g2.png".into()],
            ..Default::default()
        });
        assert_eq!(work_asset(&gallery), WorkAsset::Image("g1.png"));

        let with_url = Some(ContentData {
            url: Some("https://v".into()),
            ..Default::default()
        });
        let mut video = item(ContentType::Video);
        video.content_data = with_url.clone();
        assert_eq!(work_asset(&video), WorkAsset::VideoPlaceholder);

        let mut link = item(ContentType::Link);
        link.content_data = with_url;
        assert_eq!(work_asset(&link), WorkAsset::LinkPlaceholder);

        assert_eq!(work_asset(&item(ContentType::Video)), WorkAsset::None);
        assert_eq!(work_asset(&item(ContentType::Text)), WorkAsset::None);
    }

    #[test]
    fn test_languages_use_level_labels() {
        let style = style();
        let ctx = SectionContext::new(&style);
        let html = languages(
            &ctx,
            &[
                Language {
                    language: "English".into(),
                    level: LanguageLevel::Native,
                },
                Language {
                    language: "Elvish".into(),
                    level: LanguageLevel::Custom("fluent-ish".into()),
                },
            ],
        )
        .unwrap();
        assert!(html.contains(">English (Native)</span>"));
        assert!(html.contains(">Elvish (fluent-ish)</span>"));
    }

    #[test]
    fn test_custom_block_grid_and_colors() {
        let style = style();
        let ctx = SectionContext::new(&style);
        let block = CustomBlock {
            title: Some("About".into()),
            description: Some("line one\nline two".into()),
            image: Some("pic.png".into()),
            background_color: Some("#000000".into()),
            ..Default::default()
        };
        let html = custom_blocks(&ctx, &[block]).unwrap();
        assert!(html.contains("grid-template-columns: 45% 55%"));
        assert!(html.contains("line one<br>line two"));
        assert!(html.contains("background: #000000"));
        assert!(html.contains("color: #FFFFFF"));
        assert!(html.contains("padding: 12px"));
    }

    #[test]
    fn test_custom_block_without_image_uses_single_column() {
        let style = style();
        let ctx = SectionContext::new(&style);
        let block = CustomBlock {
            title: Some("Note".into()),
            image_size_ratio: Some(70.0),
            ..Default::default()
        };
        let html = custom_blocks(&ctx, &[block]).unwrap();
        assert!(!html.contains("custom-block-grid"));
        assert!(html.contains("<div style=\"padding: 16px;\">"));
    }

    #[test]
    fn test_image_ratio_bounds() {
        let mut block = CustomBlock::default();
        assert_eq!(image_ratio(&block), 55.0);
        block.image_size_ratio = Some(60.0);
        assert_eq!(image_ratio(&block), 60.0);
        block.image_size_ratio = Some(150.0);
        assert_eq!(image_ratio(&block), 55.0);
    }

    #[test]
    fn test_entry_subtitle_join() {
        assert_eq!(joined("Acme", "2020"), "Acme • 2020");
        assert_eq!(joined("Acme", ""), "Acme");
        assert_eq!(joined("", "2020"), "• 2020");
        assert_eq!(joined("", ""), "");
    }

    #[test]
    fn test_contacts_link_escaping() {
        let style = style();
        let ctx = SectionContext::new(&style);
        let contacts_data = Contacts {
            website: Some("javascript:alert(1)".into()),
            ..Default::default()
        };
        let html = contacts(&ctx, Some(&contacts_data), &[]).unwrap();
        assert!(html.contains("href=\"#\""));
        assert!(html.contains("data-section=\"contacts\""));
    }
}
