use super::service::{CompletionRequest, NarrativeService};
use super::{Draft, NarrativeRequest, NarrativeStrategy, TierOutcome};
use crate::config::LlmTierConfig;
use crate::constants::{LLM_TITLE_INPUT_CHARS, LLM_TITLE_MAX_MESSAGES, LLM_TITLE_MAX_TOKENS, LLM_TITLE_TEMPERATURE};
use crate::error::ServiceError;
use crate::processing::cleaner::truncate_chars;
use crate::processing::TopicGroup;

const NARRATIVE_SYSTEM: &str = "You write short narrative digests of group chat discussions. \
Write in the language of the discussion. Describe what was actually said, with concrete details, \
and avoid naming users unless it matters.";

const TITLE_SYSTEM: &str = "You name chat discussion topics. Reply with the name only.";

/// Remote tier. Guarded: skipped while the breaker is tripped.
pub struct LlmStrategy {
    service: Box<dyn NarrativeService>,
    cfg: LlmTierConfig,
}

fn narrative_prompt(keyword: &str, discussion: &str) -> String {
    format!(
        "Write a lively narrative summary (at most 10 sentences, ideally 5-7) of what was discussed \
         on the topic '{keyword}'. Start with \"In this topic they discussed\" followed by the concrete \
         subject, then describe the specific details and examples from the discussion rather than a \
         generic restatement. Write one connected paragraph: no lists, bullets, numbering or headers.\n\n\
         Discussion:\n{discussion}"
    )
}

fn title_prompt(keyword: &str, sample: &str) -> String {
    format!(
        "Give a short name (1-3 words) for the topic of this discussion. The frequent keyword \
         is '{keyword}'. No quotes, no trailing punctuation.\n\nMessages:\n{sample}"
    )
}

/// Strip quotes and punctuation from a generated title. Rejects titles that
/// are empty or longer than a few words.
pub fn sanitize_title(raw: &str) -> Option<String> {
    let first_line = raw.lines().find(|l| !l.trim().is_empty())?;
    let title = first_line
        .trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '"' | '\'' | '«' | '»' | '`' | '*' | '.' | '!' | '?' | ':' | ';')
        });
    let words = title.split_whitespace().count();
    if words == 0 || words > 5 || title.chars().count() > 60 {
        return None;
    }
    Some(title.to_string())
}

impl LlmStrategy {
    pub fn new(service: Box<dyn NarrativeService>, cfg: LlmTierConfig) -> Self {
        Self { service, cfg }
    }

    fn request(&self, system: &str, prompt: String, max_tokens: u32, temperature: f32) -> CompletionRequest {
        CompletionRequest {
            system: system.to_string(),
            prompt,
            model: self.cfg.model.clone(),
            max_tokens,
            temperature,
        }
    }

    fn title(&self, group: &TopicGroup) -> Result<Option<String>, ServiceError> {
        let sample = group
            .members
            .iter()
            .take(LLM_TITLE_MAX_MESSAGES)
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let sample = truncate_chars(&sample, LLM_TITLE_INPUT_CHARS);
        let req = self.request(
            TITLE_SYSTEM,
            title_prompt(&group.topic.keyword, &sample),
            LLM_TITLE_MAX_TOKENS,
            LLM_TITLE_TEMPERATURE,
        );
        Ok(sanitize_title(&self.service.complete(&req)?))
    }

    fn narrative(&self, group: &TopicGroup) -> Result<String, ServiceError> {
        let discussion = truncate_chars(&group.joined_text(), self.cfg.input_char_budget);
        let req = self.request(
            NARRATIVE_SYSTEM,
            narrative_prompt(&group.topic.keyword, &discussion),
            self.cfg.max_tokens,
            self.cfg.temperature,
        );
        self.service.complete(&req)
    }

    fn run(&self, group: &TopicGroup) -> Result<Draft, ServiceError> {
        let title = if self.cfg.generate_titles {
            self.title(group)?
        } else {
            None
        };
        let text = self.narrative(group)?;
        Ok(Draft { text, title })
    }
}

impl NarrativeStrategy for LlmStrategy {
    fn name(&self) -> &'static str {
        "llm"
    }

    fn guarded(&self) -> bool {
        true
    }

    fn generate(&self, request: &NarrativeRequest<'_>) -> TierOutcome {
        match self.run(request.group) {
            Ok(draft) => TierOutcome::Produced(draft),
            Err(ServiceError::NotConfigured) => TierOutcome::Skipped("service not configured".into()),
            Err(ServiceError::QuotaExceeded(msg)) => TierOutcome::Permanent(msg),
            Err(ServiceError::Transient(msg)) => TierOutcome::Retryable(msg),
        }
    }
}
