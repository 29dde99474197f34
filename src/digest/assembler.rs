use chrono::NaiveDate;

use crate::config::TopicConfig;
use crate::constants::{RAW_FALLBACK_MESSAGES, RAW_FALLBACK_SNIPPET_CHARS, TOP_ACTIVE_USERS};
use crate::message::{ChatMessage, RatingChange, UserActivity};
use crate::narrative::NarrativeResult;
use crate::processing::cleaner::{escape_html, truncate_chars};
use crate::time_utils;

pub const NO_DATA_LINE: &str = "ℹ️ No data yet for this day.";
pub const CLOSING_LINE: &str = "💬 Have a great day! 🚀";

/// One rendered topic: its narrative plus the group facts shown in the header.
#[derive(Debug, Clone)]
pub struct TopicSection {
    pub narrative: NarrativeResult,
    pub first_mentioner: String,
    pub member_count: usize,
}

#[derive(Debug, Clone)]
pub enum Discussion {
    /// Too little text, or no messages at all.
    Omitted,
    /// Topic blocks in rank order.
    Topics(Vec<TopicSection>),
    /// Messages exist but no topic survived tokenizing.
    Raw(Vec<ChatMessage>),
}

/// Everything the document is rendered from.
#[derive(Debug, Clone)]
pub struct DigestSections {
    pub date: NaiveDate,
    pub is_today: bool,
    pub activity: Vec<UserActivity>,
    pub ratings: Vec<RatingChange>,
    pub discussion: Discussion,
    /// `(label, count)`; rendered only when the count is positive.
    pub mentions: Option<(String, usize)>,
}

fn render_stats(lines: &mut Vec<String>, sections: &DigestSections) {
    if sections.activity.is_empty() {
        return;
    }
    let label = if sections.is_today {
        "today".to_string()
    } else {
        time_utils::format_day(sections.date)
    };
    lines.push(format!("🏆 <b>Top active users for {}</b>", label));
    for (i, a) in sections.activity.iter().take(TOP_ACTIVE_USERS).enumerate() {
        let sec = time_utils::estimate_seconds(a.msg_count, a.char_count);
        lines.push(format!(
            "{}. {}: <b>{}</b> messages, ≈ <b>{}</b>",
            i + 1,
            escape_html(&a.display_name),
            a.msg_count,
            time_utils::fmt_duration(sec)
        ));
    }
    lines.push(String::new());
}

fn render_ratings(lines: &mut Vec<String>, ratings: &[RatingChange]) {
    let mut moved: Vec<&RatingChange> = ratings.iter().filter(|r| r.delta != 0).collect();
    if moved.is_empty() {
        return;
    }
    moved.sort_by_key(|r| std::cmp::Reverse(r.delta.unsigned_abs()));
    lines.push("🎮 <b>Rating changes:</b>".to_string());
    for r in moved {
        let delta = if r.delta > 0 {
            format!("+{}", r.delta)
        } else {
            r.delta.to_string()
        };
        lines.push(format!("• {}: <b>{}</b> ({})", escape_html(&r.nickname), r.rating, delta));
    }
    lines.push(String::new());
}

/// Topic blocks, or the raw message list. Returns false when nothing was rendered.
fn render_discussion(lines: &mut Vec<String>, discussion: &Discussion, cfg: &TopicConfig) -> bool {
    let mut body: Vec<String> = Vec::new();
    match discussion {
        Discussion::Omitted => return false,
        Discussion::Topics(sections) => {
            for (i, s) in sections.iter().take(cfg.max_rendered).enumerate() {
                body.push(String::new());
                body.push(format!(
                    "{}. <b>{}</b> (raised by: <b>{}</b>, participants: {})",
                    i + 1,
                    escape_html(&s.narrative.topic_display_name),
                    escape_html(&s.first_mentioner),
                    s.narrative.participant_count
                ));
                body.push(format!("   {}", escape_html(&s.narrative.text)));
                if s.member_count > cfg.shown_members {
                    body.push(format!(
                        "   <i>... and {} more messages on this topic</i>",
                        s.member_count - cfg.shown_members
                    ));
                }
                body.push(String::new());
            }
        }
        Discussion::Raw(messages) => {
            for (i, m) in messages.iter().take(RAW_FALLBACK_MESSAGES).enumerate() {
                body.push(format!(
                    "{}. <b>{}</b>: {}",
                    i + 1,
                    escape_html(&m.display_name),
                    escape_html(&truncate_chars(m.text.trim(), RAW_FALLBACK_SNIPPET_CHARS))
                ));
            }
        }
    }
    while body.first().is_some_and(String::is_empty) {
        body.remove(0);
    }
    while body.last().is_some_and(String::is_empty) {
        body.pop();
    }
    if body.is_empty() {
        return false;
    }

    lines.push("📝 <b>Discussion digest:</b>".to_string());
    lines.push(String::new());
    lines.extend(body);
    true
}

/// Render the digest document. Sections are separated by blank lines; an
/// input with nothing to show yields the header, the no-data line and the
/// closing line.
pub fn assemble(sections: &DigestSections, cfg: &TopicConfig) -> String {
    let mut lines = vec![
        format!("📊 <b>Daily digest</b> — {}", time_utils::format_day(sections.date)),
        String::new(),
    ];
    let header_len = lines.len();

    render_stats(&mut lines, sections);
    render_ratings(&mut lines, &sections.ratings);
    if render_discussion(&mut lines, &sections.discussion, cfg) {
        lines.push(String::new());
    }
    if let Some((label, count)) = &sections.mentions {
        if *count > 0 {
            lines.push(format!("🔢 <b>{}:</b> <b>{}</b>", escape_html(label), count));
            lines.push(String::new());
        }
    }

    if lines.len() == header_len {
        lines.push(NO_DATA_LINE.to_string());
        lines.push(String::new());
    }
    lines.push(CLOSING_LINE.to_string());
    lines.join("\n")
}
