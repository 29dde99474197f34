//! Fit an assembled digest into at most two transport-sized chunks.
//!
//! Cut preference: the topic header nearest the character midpoint, then
//! the line nearest the midpoint. A part that is still too long is fixed by
//! moving the cut line by line; whatever cannot fit in two chunks is
//! truncated with a visible marker. All sizes are counted in chars.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::TransportConfig;
use crate::constants::{TRANSPORT_MAX_CHUNKS, TRUNCATION_MARKER};

/// `1. <b>Topic</b> ...` lines start a topic block.
static TOPIC_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s+<b>").expect("valid regex"));

static INLINE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(/?)([bi])>").expect("valid regex"));

/// Room kept for closing tags re-added after a truncation cut (`</b></i>`).
const CLOSING_TAGS_RESERVE: usize = 8;

fn clen(s: &str) -> usize {
    s.chars().count()
}

fn join_trim(lines: &[String]) -> String {
    lines.join("\n").trim().to_string()
}

/// Which rule picked the cut line, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CutKind {
    TopicBoundary,
    Line,
}

pub struct Splitter {
    max_chars: usize,
    continuation: String,
}

impl Splitter {
    pub fn new(max_chars: usize, continuation: impl Into<String>) -> Self {
        Self { max_chars, continuation: continuation.into() }
    }

    pub fn from_config(cfg: &TransportConfig) -> Self {
        Self::new(cfg.max_chars, cfg.continuation_marker.clone())
    }

    /// Budget for chunk contents after the first, which carry the marker.
    fn second_limit(&self) -> usize {
        self.max_chars.saturating_sub(clen(&self.continuation))
    }

    /// One chunk when `text` fits, otherwise exactly two (the second
    /// prefixed with the continuation marker), each within `max_chars`.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_prefixed(text, "")
    }

    /// `split`, with `prefix` in front of the first chunk. The prefix counts
    /// against the first chunk's budget.
    pub fn split_prefixed(&self, text: &str, prefix: &str) -> Vec<String> {
        let total = clen(text);
        let first_limit = self.max_chars.saturating_sub(clen(prefix));
        if total <= first_limit {
            return vec![format!("{}{}", prefix, text)];
        }

        let second_limit = self.second_limit();
        let lines = wrap_long_lines(text, first_limit.min(second_limit));

        let (cut, kind) = choose_cut(&lines);
        let cut = fit_cut(&lines, cut, first_limit, second_limit);

        let first = join_trim(&lines[..cut]);
        let mut second = join_trim(&lines[cut..]);
        let truncated = clen(&second) > second_limit;
        if truncated {
            tracing::warn!(
                chars = clen(&second),
                limit = second_limit,
                "Digest exceeds two chunks, truncating"
            );
            second = truncate_markup(&second, second_limit);
        }

        let mut chunks: Vec<String> = Vec::with_capacity(TRANSPORT_MAX_CHUNKS);
        if !first.is_empty() {
            chunks.push(format!("{}{}", prefix, first));
        }
        if !second.is_empty() {
            if chunks.is_empty() {
                if clen(&second) > first_limit {
                    second = truncate_markup(&second, first_limit);
                }
                chunks.push(format!("{}{}", prefix, second));
            } else {
                chunks.push(format!("{}{}", self.continuation, second));
            }
        }
        if chunks.is_empty() {
            chunks.push(format!("{}{}", prefix, text.trim()));
        }

        tracing::info!(
            total,
            chunks = chunks.len(),
            cut = ?kind,
            truncated,
            "Digest split for transport"
        );
        chunks
    }
}

/// Break every line longer than `limit` chars, at the last whitespace of the
/// window when it sits in its second half, otherwise exactly at `limit`.
fn wrap_long_lines(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut out = Vec::new();
    for line in text.split('\n') {
        let mut rest: Vec<char> = line.chars().collect();
        while rest.len() > limit {
            let window = &rest[..limit];
            let ws = window.iter().rposition(|c| c.is_whitespace()).filter(|&i| i >= limit / 2);
            let (piece, resume) = match ws {
                Some(i) => (window[..i].iter().collect::<String>(), i + 1),
                None => (window.iter().collect::<String>(), limit),
            };
            out.push(piece);
            rest.drain(..resume);
        }
        out.push(rest.into_iter().collect());
    }
    out
}

/// Line index to cut before (always ≥ 1 when there are two or more lines).
fn choose_cut(lines: &[String]) -> (usize, CutKind) {
    let mut starts = Vec::with_capacity(lines.len());
    let mut pos = 0usize;
    for line in lines {
        starts.push(pos);
        pos += clen(line) + 1;
    }
    let mid = pos.saturating_sub(1) / 2;
    let nearest = |candidates: &[usize]| {
        candidates
            .iter()
            .copied()
            .min_by_key(|&i| starts[i].abs_diff(mid))
    };

    let boundaries: Vec<usize> = (1..lines.len())
        .filter(|&i| TOPIC_HEADER.is_match(&lines[i]))
        .collect();
    if boundaries.len() >= 2 {
        if let Some(i) = nearest(&boundaries) {
            return (i, CutKind::TopicBoundary);
        }
    }

    let all: Vec<usize> = (1..lines.len()).collect();
    (nearest(&all).unwrap_or(lines.len()), CutKind::Line)
}

/// Move the cut until the first part fits. When only the second part is too
/// long, pull its leading lines into the first part while they fit.
fn fit_cut(lines: &[String], cut: usize, first_limit: usize, second_limit: usize) -> usize {
    let fits_first = |j: usize| clen(&join_trim(&lines[..j])) <= first_limit;
    let fits_second = |j: usize| clen(&join_trim(&lines[j..])) <= second_limit;

    let mut j = cut;
    if !fits_first(j) {
        while j > 1 && !fits_first(j) {
            j -= 1;
        }
        return j;
    }
    while !fits_second(j) && j < lines.len() && fits_first(j + 1) {
        j += 1;
    }
    j
}

/// Closing tags for every `<b>`/`<i>` left open in `s`, innermost first.
fn closing_tags(s: &str) -> String {
    let mut open: Vec<&str> = Vec::new();
    for cap in INLINE_TAG.captures_iter(s) {
        let name = cap.get(2).map_or("", |m| m.as_str());
        if cap.get(1).is_some_and(|m| m.as_str() == "/") {
            if let Some(pos) = open.iter().rposition(|t| *t == name) {
                open.remove(pos);
            }
        } else {
            open.push(name);
        }
    }
    open.iter().rev().map(|t| format!("</{}>", t)).collect()
}

/// Cut `text` so that it plus the truncation marker fits `limit` chars.
/// Prefers a line break, never leaves half a tag or entity, and closes any
/// tag the cut left open.
pub fn truncate_markup(text: &str, limit: usize) -> String {
    let reserve = clen(TRUNCATION_MARKER) + CLOSING_TAGS_RESERVE;
    let budget = limit.saturating_sub(reserve);
    let mut cut: String = text.chars().take(budget).collect();

    if let Some(nl) = cut.rfind('\n') {
        if clen(&cut[..nl]) >= budget / 2 {
            cut.truncate(nl);
        }
    }
    if let Some(lt) = cut.rfind('<') {
        if !cut[lt..].contains('>') {
            cut.truncate(lt);
        }
    }
    if let Some(amp) = cut.rfind('&') {
        if !cut[amp..].contains(';') {
            cut.truncate(amp);
        }
    }

    let mut out = cut.trim_end().to_string();
    out.push_str(&closing_tags(&out));
    out.push_str(TRUNCATION_MARKER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CONTINUATION_MARKER, TRANSPORT_MAX_CHARS};

    fn splitter() -> Splitter {
        Splitter::new(TRANSPORT_MAX_CHARS, CONTINUATION_MARKER)
    }

    fn no_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Header, then `blocks` topic blocks whose narrative line has `words` words.
    fn digest(blocks: usize, words: usize) -> String {
        let mut doc = String::from("📊 <b>Daily digest</b> — 16.10.2026\n\n📝 <b>Discussion digest:</b>\n");
        for i in 1..=blocks {
            doc.push_str(&format!(
                "\n{}. <b>Topic{}</b> (raised by: <b>Ann</b>, participants: 2)\n   {}\n",
                i,
                i,
                "word ".repeat(words).trim_end()
            ));
        }
        doc.push_str("\n💬 Have a great day! 🚀");
        doc
    }

    fn assert_within_limits(chunks: &[String]) {
        assert!(!chunks.is_empty() && chunks.len() <= TRANSPORT_MAX_CHUNKS);
        for c in chunks {
            assert!(clen(c) <= TRANSPORT_MAX_CHARS, "chunk of {} chars", clen(c));
        }
    }

    #[test]
    fn test_short_text_is_one_unchanged_chunk() {
        let doc = digest(2, 10);
        assert_eq!(splitter().split(&doc), vec![doc.clone()]);

        let exact = "x".repeat(TRANSPORT_MAX_CHARS);
        assert_eq!(splitter().split(&exact), vec![exact.clone()]);
    }

    #[test]
    fn test_cuts_at_boundary_nearest_midpoint() {
        let doc = digest(4, 340);
        let total = clen(&doc);
        assert!(total > TRANSPORT_MAX_CHARS && total < 2 * (TRANSPORT_MAX_CHARS - 100));

        let chunks = splitter().split(&doc);
        assert_eq!(chunks.len(), 2);
        assert_within_limits(&chunks);
        let second = chunks[1].strip_prefix(CONTINUATION_MARKER).unwrap();
        assert!(
            second.starts_with("3. <b>Topic3</b>"),
            "{}",
            second.chars().take(40).collect::<String>()
        );
        assert_eq!(no_ws(&format!("{}{}", chunks[0], second)), no_ws(&doc));
    }

    #[test]
    fn test_nine_thousand_chars_four_boundaries() {
        let doc = digest(4, 440);
        let total = clen(&doc);
        assert!((8800..=9200).contains(&total), "doc is {} chars", total);

        let chunks = splitter().split(&doc);
        assert_eq!(chunks.len(), 2);
        assert_within_limits(&chunks);
        assert!(chunks[0].starts_with("📊 <b>Daily digest</b>"));
        assert!(chunks[1].starts_with(CONTINUATION_MARKER));
        // 9000 chars cannot fit in 2 × 4096: the tail is cut visibly.
        assert!(chunks[1].ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_line_split_without_boundaries() {
        let doc: String = (0..100).map(|i| format!("line {:03} {}\n", i, "z".repeat(50))).collect();
        let chunks = splitter().split(&doc);
        assert_eq!(chunks.len(), 2);
        assert_within_limits(&chunks);
        let second = chunks[1].strip_prefix(CONTINUATION_MARKER).unwrap();
        assert_eq!(no_ws(&format!("{}{}", chunks[0], second)), no_ws(&doc));
        // Cut near the middle, not at the limit.
        assert!(chunks[0].starts_with("line 000"));
        assert!(second.starts_with("line 05") || second.starts_with("line 04"));
    }

    #[test]
    fn test_single_boundary_uses_line_split() {
        let mut doc = digest(1, 10);
        for i in 0..120 {
            doc.push_str(&format!("\nplain line {} {}", i, "q".repeat(40)));
        }
        let chunks = splitter().split(&doc);
        assert_eq!(chunks.len(), 2);
        assert_within_limits(&chunks);
    }

    #[test]
    fn test_giant_single_line_is_wrapped_and_truncated() {
        let doc = "y".repeat(10_000);
        let chunks = splitter().split(&doc);
        assert_eq!(chunks.len(), 2);
        assert_within_limits(&chunks);
        assert!(chunks[1].ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_oversized_first_part_packs_lines() {
        // Boundaries sit at the very end, so the part before the nearest one is too long.
        let mut doc = String::from("intro\n");
        for i in 0..150 {
            doc.push_str(&format!("filler {} {}\n", i, "f".repeat(40)));
        }
        doc.push_str("1. <b>A</b> x\n2. <b>B</b> y\n3. <b>C</b> z");
        let chunks = splitter().split(&doc);
        assert_eq!(chunks.len(), 2);
        assert_within_limits(&chunks);
        assert!(chunks[1].contains("3. <b>C</b> z"));
        assert!(!chunks[1].ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_prefix_counts_against_first_chunk() {
        let prefix = "📊 <b>Digest for chat -1001</b>\n\n";

        let small = digest(1, 10);
        assert_eq!(splitter().split_prefixed(&small, prefix), vec![format!("{}{}", prefix, small)]);

        // Fits alone, but not together with the prefix.
        let edge = "e".repeat(TRANSPORT_MAX_CHARS - 5);
        let chunks = splitter().split_prefixed(&edge, prefix);
        assert_eq!(chunks.len(), 2);
        assert_within_limits(&chunks);

        for doc in [digest(4, 340), digest(4, 440), "y".repeat(10_000)] {
            let chunks = splitter().split_prefixed(&doc, prefix);
            assert_within_limits(&chunks);
            assert!(chunks[0].starts_with(prefix));
            assert!(chunks[1].starts_with(CONTINUATION_MARKER));
            assert!(!chunks[1].contains("Digest for chat"));
        }
    }

    #[test]
    fn test_truncate_markup_closes_open_tag() {
        let reserve = clen(TRUNCATION_MARKER) + CLOSING_TAGS_RESERVE;
        let text = format!("{}<b>bold text here</b> tail", "a".repeat(50));

        let out = truncate_markup(&text, reserve + 60);
        assert!(out.contains("<b>bold te</b>"));
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert!(clen(&out) <= reserve + 60);

        // Cut inside the closing tag: the fragment is dropped and re-closed.
        let out = truncate_markup(&text, reserve + 70);
        assert!(out.contains("bold text here</b>"));
        assert!(!out.contains("</b</b>"));
    }

    #[test]
    fn test_truncate_markup_drops_partial_entity() {
        let reserve = clen(TRUNCATION_MARKER) + CLOSING_TAGS_RESERVE;
        let text = format!("{}&amp; more", "a".repeat(10));
        let out = truncate_markup(&text, reserve + 13);
        assert!(out.starts_with(&"a".repeat(10)));
        assert!(!out.contains('&'));
    }

    #[test]
    fn test_wrap_long_lines_prefers_whitespace() {
        let lines = wrap_long_lines("aaaa bbbb cccc", 10);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc"]);
        let lines = wrap_long_lines(&"x".repeat(25), 10);
        assert_eq!(lines.iter().map(|l| clen(l)).collect::<Vec<_>>(), vec![10, 10, 5]);
    }
}
