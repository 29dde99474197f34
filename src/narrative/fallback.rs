use super::{Draft, NarrativeRequest, NarrativeStrategy, TierOutcome};
use crate::config::FallbackTierConfig;
use crate::processing::cleaner::{clean_narrative, collapse_whitespace, truncate_chars};
use crate::processing::TopicGroup;

/// Join the group's first meaningful messages into a paragraph.
///
/// Meaningful = longer than `meaningful_min_chars` once trimmed. When no
/// member qualifies every member is used. No randomness: equal groups give
/// equal text.
pub fn stitch(group: &TopicGroup, cfg: &FallbackTierConfig) -> String {
    let meaningful: Vec<&str> = group
        .members
        .iter()
        .map(|m| m.text.trim())
        .filter(|t| t.chars().count() > cfg.meaningful_min_chars)
        .take(cfg.max_messages)
        .collect();

    let picked: Vec<&str> = if meaningful.is_empty() {
        group.members.iter().map(|m| m.text.trim()).collect()
    } else {
        meaningful
    };

    let joined = collapse_whitespace(&clean_narrative(&picked.join(" ")));
    truncate_chars(&joined, cfg.max_chars)
}

pub struct FallbackStrategy {
    cfg: FallbackTierConfig,
}

impl FallbackStrategy {
    pub fn new(cfg: FallbackTierConfig) -> Self {
        Self { cfg }
    }
}

impl NarrativeStrategy for FallbackStrategy {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn generate(&self, request: &NarrativeRequest<'_>) -> TierOutcome {
        TierOutcome::Produced(Draft::text(stitch(request.group, &self.cfg)))
    }
}
