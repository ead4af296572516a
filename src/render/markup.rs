//! Markup helpers shared by the section builders.

use std::fmt::Write;

/// Escape text content.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text and turn line breaks into `<br>`.
pub fn escape_multiline(input: &str) -> String {
    input
        .split('\n')
        .map(|line| escape_text(line.trim_end_matches('\r')))
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Attribute-escaped URL. Script URLs are replaced with `#`.
pub fn safe_url(url: &str) -> String {
    let trimmed = url.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with("javascript:") || lowered.starts_with("vbscript:") {
        return "#".to_string();
    }
    escape_attr(trimmed)
}

/// Format a CSS number with at most two decimals and no trailing zeros.
pub fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        // Avoid "-0".
        return "0".to_string();
    }
    format!("{}", rounded)
}

/// Whether an optional text field carries anything worth rendering.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Accumulates markup with one element per line.
#[derive(Debug, Default)]
pub struct MarkupWriter {
    buf: String,
}

impl MarkupWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, fragment: impl AsRef<str>) -> &mut Self {
        self.buf.push_str(fragment.as_ref());
        self.buf.push('\n');
        self
    }

    /// Append pre-formatted markup without a trailing newline.
    pub fn raw(&mut self, fragment: impl AsRef<str>) -> &mut Self {
        self.buf.push_str(fragment.as_ref());
        self
    }

    pub fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
        let _ = write!(self.buf, "<{}", tag);
        for (name, value) in attrs {
            let _ = write!(self.buf, " {}=\"{}\"", name, escape_attr(value));
        }
        self.buf.push_str(">\n");
        self
    }

    pub fn close(&mut self, tag: &str) -> &mut Self {
        let _ = writeln!(self.buf, "</{}>", tag);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
