use std::sync::LazyLock;

use regex::Regex;

/// `🎯 Topic (raised by: x) ...` and `🎯 Topic:` header echoes.
static HEADER_WITH_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"🎯\s*[^(]*\([^)]*\)[^.]*\.?\s*").expect("valid regex"));
static HEADER_WITH_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"🎯\s*[^:]*:\s*").expect("valid regex"));

/// List markers: any run of bullet (`-`, `•`, `*`), numbered (`1.`) or
/// lettered (`a)`) markers at line start; a bullet after whitespace; numbered
/// or lettered markers right after a sentence end, whose punctuation is
/// captured and kept. `level 10. Nice` is prose, not a list.
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?:[-•*]|\d{1,2}\.|[a-z]\))\s+)+|\s[-•*]\s+|([.!?])\s+(?:(?:\d{1,2}\.|[a-z]\))\s+)+",
    )
    .expect("valid regex")
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Collapse all whitespace runs (newlines included) to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Turn generated or stitched text into one plain paragraph.
///
/// Drops topic-header echoes and list markers, joins lines, collapses
/// whitespace. The result holds no line-leading list marker and
/// `clean_narrative(clean_narrative(x)) == clean_narrative(x)`.
pub fn clean_narrative(raw: &str) -> String {
    let text = HEADER_WITH_PARENS.replace_all(raw, "");
    let mut text = HEADER_WITH_COLON.replace_all(&text, "").into_owned();

    // Markers can nest ("- 1. foo"); strip until stable.
    loop {
        let next = collapse_whitespace(&LIST_MARKER.replace_all(&text, "${1} "));
        if next == text {
            return next;
        }
        text = next;
    }
}

/// At most `max_chars` characters; longer text is cut and gets `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Escape `&`, `<`, `>` and `"` for the HTML subset the transport renders.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
