//! Narrative generation: turn a topic group into one paragraph of prose.
//!
//! Tiers are tried in order and the first one that produces text wins:
//!   1. llm: remote chat-completion service, guarded by the circuit breaker
//!   2. extractive: TextRank over the group's sentences
//!   3. fallback: the group's first meaningful messages, stitched together
//!
//! Each tier reports a `TierOutcome` instead of raising; the generator
//! decides what a failure means (fall through, or trip the breaker).

pub mod breaker;
pub mod extractive;
pub mod fallback;
pub mod generator;
pub mod llm;
pub mod service;

use serde::{Deserialize, Serialize};

use crate::processing::{Topic, TopicGroup};

pub use breaker::CircuitBreaker;
pub use generator::{ensure_lead_in, NarrativeGenerator};
pub use service::{CompletionRequest, NarrativeService, OpenAiService};

/// What a tier needs to describe one group.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeRequest<'a> {
    pub group: &'a TopicGroup,
    /// The full ranking, in rank order. The extractive tier regroups by it.
    pub ranked: &'a [Topic],
}

/// Raw tier output, before cleanup and lead-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    /// Generated topic title, replacing the capitalised keyword.
    pub title: Option<String>,
}

impl Draft {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), title: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOutcome {
    Produced(Draft),
    /// Tier not applicable to this request.
    Skipped(String),
    /// Transient failure; later requests may still use this tier.
    Retryable(String),
    /// Quota or rate limit. Trips the breaker when the tier is guarded.
    Permanent(String),
}

pub trait NarrativeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Guarded tiers are skipped while the circuit breaker is tripped.
    fn guarded(&self) -> bool {
        false
    }

    fn generate(&self, request: &NarrativeRequest<'_>) -> TierOutcome;
}

/// Final per-topic narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeResult {
    pub topic_display_name: String,
    pub text: String,
    pub participant_count: usize,
    /// Name of the tier that produced `text`.
    pub tier: String,
}
