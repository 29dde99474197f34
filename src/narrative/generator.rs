use std::sync::Arc;

use super::breaker::CircuitBreaker;
use super::extractive::ExtractiveStrategy;
use super::fallback::{self, FallbackStrategy};
use super::llm::LlmStrategy;
use super::service::NarrativeService;
use super::{Draft, NarrativeRequest, NarrativeResult, NarrativeStrategy, TierOutcome};
use crate::config::{FallbackTierConfig, NarrativeConfig};
use crate::processing::cleaner::clean_narrative;
use crate::processing::{Topic, TopicGroup};

/// Openings that already frame the topic, matched case-insensitively.
const LEAD_INS: &[&str] = &[
    "in this topic",
    "they discussed",
    "they talked about",
    "discussed",
    "в цій темі",
    "обговорювали",
    "говорили",
    "розмовляли",
];

/// Prepend "In this topic they discussed {name}." unless `text` already
/// opens with a recognised lead-in.
pub fn ensure_lead_in(text: &str, display_name: &str) -> String {
    let lower = text.trim_start().to_lowercase();
    if LEAD_INS.iter().any(|p| lower.starts_with(p)) {
        return text.trim().to_string();
    }
    let lead = format!("In this topic they discussed {}.", display_name.to_lowercase());
    if text.trim().is_empty() {
        lead
    } else {
        format!("{} {}", lead, text.trim())
    }
}

/// Runs the tiers in order for each topic group.
pub struct NarrativeGenerator {
    strategies: Vec<Box<dyn NarrativeStrategy>>,
    breaker: Arc<CircuitBreaker>,
    fallback: FallbackTierConfig,
}

impl NarrativeGenerator {
    /// Decide once which tiers exist for this session.
    ///
    /// The remote tier joins only when enabled, keyed, and the service says
    /// it is available; the extractive tier when enabled; the deterministic
    /// tier always, last.
    pub fn probe(
        cfg: &NarrativeConfig,
        service: Option<Box<dyn NarrativeService>>,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        let mut strategies: Vec<Box<dyn NarrativeStrategy>> = Vec::new();

        match service {
            Some(svc) if cfg.llm.is_configured() && svc.is_available() => {
                strategies.push(Box::new(LlmStrategy::new(svc, cfg.llm.clone())));
            }
            Some(_) => tracing::info!("Narrative service present but not configured, remote tier off"),
            None => tracing::debug!("No narrative service, remote tier off"),
        }
        if cfg.extractive.enabled {
            strategies.push(Box::new(ExtractiveStrategy::new(cfg.extractive.clone())));
        }
        strategies.push(Box::new(FallbackStrategy::new(cfg.fallback.clone())));

        let generator = Self::with_strategies(strategies, breaker, cfg.fallback.clone());
        tracing::info!(tiers = ?generator.tier_names(), "Narrative tiers probed");
        generator
    }

    pub fn with_strategies(
        strategies: Vec<Box<dyn NarrativeStrategy>>,
        breaker: Arc<CircuitBreaker>,
        fallback: FallbackTierConfig,
    ) -> Self {
        Self { strategies, breaker, fallback }
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Narrative for one group. Never fails: when every tier declines, the
    /// deterministic stitch is used directly.
    pub fn generate(&self, group: &TopicGroup, ranked: &[Topic]) -> NarrativeResult {
        let request = NarrativeRequest { group, ranked };
        let keyword = group.topic.keyword.as_str();

        for strategy in &self.strategies {
            let tier = strategy.name();
            if strategy.guarded() && self.breaker.is_tripped() {
                tracing::debug!(tier, keyword, "Breaker tripped, tier skipped");
                continue;
            }
            match strategy.generate(&request) {
                TierOutcome::Produced(draft) => {
                    tracing::debug!(tier, keyword, "Narrative produced");
                    return self.finish(group, draft, tier);
                }
                TierOutcome::Skipped(reason) => {
                    tracing::debug!(tier, keyword, reason = %reason, "Tier skipped");
                }
                TierOutcome::Retryable(reason) => {
                    tracing::warn!(tier, keyword, reason = %reason, "Tier failed, falling through");
                }
                TierOutcome::Permanent(reason) => {
                    if strategy.guarded() {
                        self.breaker.trip();
                    }
                    tracing::warn!(tier, keyword, reason = %reason, "Tier exhausted, falling through");
                }
            }
        }

        let draft = Draft::text(fallback::stitch(group, &self.fallback));
        self.finish(group, draft, "fallback")
    }

    fn finish(&self, group: &TopicGroup, draft: Draft, tier: &str) -> NarrativeResult {
        let display = draft.title.unwrap_or_else(|| group.topic.display_name());
        let text = ensure_lead_in(&clean_narrative(&draft.text), &display);
        NarrativeResult {
            topic_display_name: display,
            text,
            participant_count: group.participant_count(),
            tier: tier.to_string(),
        }
    }
}
