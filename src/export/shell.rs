//! Standalone document shell.
//!
//! Wraps rendered markup into a complete document that carries its own
//! stylesheet and font, so it looks the same outside the editor.

use crate::export::fonts::{font_stack, stylesheet_url};
use crate::render::markup::{escape_attr, escape_text};

/// Selector of blocks that paginated output keeps on one page.
pub const AVOID_BREAK_SELECTOR: &str = "[data-section]";

/// Shell parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellOptions {
    pub title: String,
    pub lang: String,
    pub font_family: String,
    /// Font that is never linked.
    pub system_font: String,
    /// Solid page color behind the portfolio.
    pub background: String,
    pub container_width_px: u32,
    /// Appended to the base stylesheet.
    pub extra_stylesheet: String,
    /// Add print rules for paginated output.
    pub paginated: bool,
}

impl ShellOptions {
    fn font_link(&self) -> Option<String> {
        let family = self.font_family.trim();
        if family.is_empty() || family == self.system_font {
            return None;
        }
        Some(format!(
            "<link href=\"{}\" rel=\"stylesheet\">",
            escape_attr(&stylesheet_url(family))
        ))
    }

    fn stylesheet(&self) -> String {
        let mut css = format!(
            "* {{ box-sizing: border-box; }}\n\
             body {{ margin: 0; padding: 0; font-family: {}; }}\n\
             .portfolio-export-container {{ width: 100%; max-width: {}px; margin: 0 auto; padding: 2rem; }}\n\
             .portfolio-export-container img {{ max-width: 100%; }}\n",
            font_stack(&self.font_family),
            self.container_width_px
        );
        if self.paginated {
            css.push_str(&format!(
                "{} {{ break-inside: avoid; page-break-inside: avoid; }}\n\
                 @media print {{ body {{ -webkit-print-color-adjust: exact; print-color-adjust: exact; }} }}\n",
                AVOID_BREAK_SELECTOR
            ));
        }
        let extra = self.extra_stylesheet.trim();
        if !extra.is_empty() {
            css.push_str(extra);
            css.push('\n');
        }
        // Keep user CSS from closing the style element early.
        css.replace("</style", "<\\/style")
    }
}

/// Build the full document around `body`.
pub fn document_shell(body: &str, options: &ShellOptions) -> String {
    let title = if options.title.trim().is_empty() {
        "Portfolio"
    } else {
        options.title.trim()
    };

    let mut doc = String::with_capacity(body.len() + 1024);
    doc.push_str("<!DOCTYPE html>\n");
    doc.push_str(&format!("<html lang=\"{}\">\n", escape_attr(&options.lang)));
    doc.push_str("<head>\n");
    doc.push_str("<meta charset=\"UTF-8\">\n");
    doc.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    doc.push_str(&format!("<title>{}</title>\n", escape_text(title)));
    if let Some(link) = options.font_link() {
        doc.push_str(&link);
        doc.push('\n');
    }
    doc.push_str("<style>\n");
    doc.push_str(&options.stylesheet());
    doc.push_str("</style>\n");
    doc.push_str("</head>\n");
    doc.push_str(&format!(
        "<body style=\"margin: 0; padding: 0; background: {};\">\n",
        escape_attr(&options.background)
    ));
    doc.push_str("<div class=\"portfolio-export-container\">\n");
    doc.push_str(body);
    if !body.ends_with('\n') {
        doc.push('\n');
    }
    doc.push_str("</div>\n</body>\n</html>\n");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ShellOptions {
        ShellOptions {
            title: "Alice & Co".into(),
            lang: "en".into(),
            font_family: "Inter".into(),
            system_font: "Inter".into(),
            background: "#ffffff".into(),
            container_width_px: 1200,
            extra_stylesheet: String::new(),
            paginated: false,
        }
    }

    #[test]
    fn test_shell_wraps_body() {
        let doc = document_shell("<p>hi</p>", &options());
        assert!(doc.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(doc.contains("<title>Alice &amp; Co</title>"));
        assert!(doc.contains("<div class=\"portfolio-export-container\">\n<p>hi</p>\n</div>"));
        assert!(doc.contains("background: #ffffff;"));
        assert!(doc.contains("font-family: 'Inter', sans-serif;"));
    }

    #[test]
    fn test_system_font_not_linked() {
        let doc = document_shell("", &options());
        assert!(!doc.contains("fonts.googleapis.com"));

        let mut opts = options();
        opts.font_family = "Open Sans".into();
        let doc = document_shell("", &opts);
        assert!(doc.contains("family=Open+Sans:wght@"));
    }

    #[test]
    fn test_paginated_rules_only_when_paginated() {
        assert!(!document_shell("", &options()).contains("break-inside: avoid"));
        let mut opts = options();
        opts.paginated = true;
        assert!(document_shell("", &opts).contains("[data-section] { break-inside: avoid;"));
    }

    #[test]
    fn test_blank_title_and_hostile_css() {
        let mut opts = options();
        opts.title = " ".into();
        opts.extra_stylesheet = "p{}</style><script>".into();
        let doc = document_shell("", &opts);
        assert!(doc.contains("<title>Portfolio</title>"));
        assert!(!doc.contains("</style><script>"));
    }
}
