//! Digest configuration: topic limits, narrative tiers, transport, storage.
//!
//! Loaded from a TOML file (every key optional), then overridden from the
//! environment. Each narrative tier is independently configurable:
//!   - llm: remote chat-completion service (tier 1, guarded by the breaker)
//!   - extractive: offline sentence ranking (tier 2)
//!   - fallback: deterministic message stitching (tier 3, always on)

use crate::constants;
use crate::{DigestError, DigestResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// TOPICS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Upper bound on ranked topics.
    pub max_topics: usize,
    /// Keywords seen in fewer messages than this are not topics.
    pub min_frequency: usize,
    /// Topic blocks rendered in the digest.
    pub max_rendered: usize,
    /// Messages represented per topic before the overflow note kicks in.
    pub shown_members: usize,
    /// Below this many characters of total text the discussion section is omitted.
    pub min_summary_chars: usize,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            max_topics: constants::MAX_TOPICS,
            min_frequency: constants::MIN_TOPIC_FREQUENCY,
            max_rendered: constants::MAX_RENDERED_TOPICS,
            shown_members: constants::SHOWN_MEMBERS_PER_TOPIC,
            min_summary_chars: constants::MIN_SUMMARY_TEXT_CHARS,
        }
    }
}

// ============================================================================
// NARRATIVE TIERS
// ============================================================================

/// Tier 1: remote chat-completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmTierConfig {
    pub enabled: bool,
    /// Usually injected from `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Group text beyond this many characters is cut before prompting.
    pub input_char_budget: usize,
    /// Ask the service for a short topic title before the narrative.
    pub generate_titles: bool,
}

impl Default for LlmTierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            base_url: constants::DEFAULT_LLM_BASE_URL.to_string(),
            model: constants::DEFAULT_LLM_MODEL.to_string(),
            max_tokens: constants::LLM_NARRATIVE_MAX_TOKENS,
            temperature: constants::LLM_NARRATIVE_TEMPERATURE,
            timeout_secs: constants::LLM_TIMEOUT_SECS,
            input_char_budget: constants::LLM_INPUT_CHAR_BUDGET,
            generate_titles: true,
        }
    }
}

impl LlmTierConfig {
    /// Enabled and holding a non-empty key.
    pub fn is_configured(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Tier 2: offline sentence ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractiveTierConfig {
    pub enabled: bool,
    pub min_sentences: usize,
    pub max_sentences: usize,
    pub sentences_per_block: usize,
    /// Longer blocks are cut and end in `...`.
    pub max_chars: usize,
}

impl Default for ExtractiveTierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_sentences: constants::EXTRACTIVE_MIN_SENTENCES,
            max_sentences: constants::EXTRACTIVE_MAX_SENTENCES,
            sentences_per_block: constants::EXTRACTIVE_SENTENCES_PER_BLOCK,
            max_chars: constants::EXTRACTIVE_MAX_CHARS,
        }
    }
}

/// Tier 3: deterministic stitching of the group's own messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackTierConfig {
    /// A message must be strictly longer than this (trimmed) to be "meaningful".
    pub meaningful_min_chars: usize,
    pub max_messages: usize,
    pub max_chars: usize,
}

impl Default for FallbackTierConfig {
    fn default() -> Self {
        Self {
            meaningful_min_chars: constants::MEANINGFUL_MESSAGE_MIN_CHARS,
            max_messages: constants::FALLBACK_MAX_MESSAGES,
            max_chars: constants::FALLBACK_MAX_CHARS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub llm: LlmTierConfig,
    pub extractive: ExtractiveTierConfig,
    pub fallback: FallbackTierConfig,
}

// ============================================================================
// MENTION COUNTER
// ============================================================================

/// Regex patterns counted case-insensitively across all messages of the day.
/// An empty pattern list disables the section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionConfig {
    pub label: String,
    pub patterns: Vec<String>,
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            label: "Мєнт счьотчік".to_string(),
            patterns: vec![
                r"\bм[єе]нт\b".to_string(),
                r"\bмусор\b".to_string(),
                r"\bм[єе]нт[а-яіїє]*\b".to_string(),
                r"\bмусор[а-яіїє]*\b".to_string(),
            ],
        }
    }
}

// ============================================================================
// TRANSPORT / STORAGE / SCHEDULE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Hard per-chunk limit of the chat platform, in characters.
    pub max_chars: usize,
    /// Prefixed to every chunk after the first.
    pub continuation_marker: String,
    /// Bot token, usually injected from `TELEGRAM_BOT_TOKEN`.
    pub bot_token: Option<String>,
    pub api_base: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_chars: constants::TRANSPORT_MAX_CHARS,
            continuation_marker: constants::CONTINUATION_MARKER.to_string(),
            bot_token: None,
            api_base: constants::TELEGRAM_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: crate::storage::path_utils::default_db_path()
                .to_string_lossy()
                .into_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local wall-clock time (`HH:MM`) the daily digest goes out.
    pub summary_time: String,
    /// Where scheduled digests are delivered. No admin chat → nothing is sent.
    pub admin_chat_id: Option<i64>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            summary_time: constants::DEFAULT_SUMMARY_TIME.to_string(),
            admin_chat_id: None,
        }
    }
}

// ============================================================================
// ROOT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub topics: TopicConfig,
    pub narrative: NarrativeConfig,
    pub mentions: MentionConfig,
    pub transport: TransportConfig,
    pub storage: StorageConfig,
    pub schedule: ScheduleConfig,
}

impl DigestConfig {
    /// Load from a TOML file, then apply environment overrides and validate.
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: &Path) -> DigestResult<Self> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.validate();
        Ok(cfg)
    }

    pub fn from_toml(content: &str) -> DigestResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay values taken from `lookup` (the process environment in production).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.narrative.llm.api_key = Some(key);
        }
        if let Some(flag) = non_empty("USE_OPENAI_SUMMARY") {
            self.narrative.llm.enabled = flag.eq_ignore_ascii_case("true");
        }
        if let Some(token) = non_empty("TELEGRAM_BOT_TOKEN").or_else(|| non_empty("BOT_TOKEN")) {
            self.transport.bot_token = Some(token);
        }
        if let Some(path) = non_empty("DIGEST_DB_PATH") {
            self.storage.db_path = path;
        }
        if let Some(id) = non_empty("DIGEST_ADMIN_CHAT_ID") {
            match id.parse::<i64>() {
                Ok(v) => self.schedule.admin_chat_id = Some(v),
                Err(_) => tracing::warn!(value = %id, "DIGEST_ADMIN_CHAT_ID is not an integer, ignored"),
            }
        }
    }

    /// Clamp values that would break the pipeline's invariants.
    pub fn validate(&mut self) {
        let t = &mut self.topics;
        t.max_topics = t.max_topics.clamp(1, constants::MAX_TOPICS);
        t.min_frequency = t.min_frequency.max(1);
        t.max_rendered = t.max_rendered.clamp(1, t.max_topics);
        t.shown_members = t.shown_members.max(1);

        let e = &mut self.narrative.extractive;
        e.min_sentences = e.min_sentences.max(1);
        if e.max_sentences < e.min_sentences {
            tracing::warn!(
                min = e.min_sentences,
                max = e.max_sentences,
                "extractive.max_sentences below min_sentences, raised"
            );
            e.max_sentences = e.min_sentences;
        }
        e.sentences_per_block = e.sentences_per_block.max(1);
        e.max_chars = e.max_chars.max(50);

        let f = &mut self.narrative.fallback;
        f.max_messages = f.max_messages.max(1);
        f.max_chars = f.max_chars.max(50);

        let llm = &mut self.narrative.llm;
        llm.temperature = llm.temperature.clamp(0.0, 2.0);
        llm.input_char_budget = llm.input_char_budget.max(100);

        // The limit must leave room for both markers plus some content.
        let floor = self.transport.continuation_marker.chars().count()
            + constants::TRUNCATION_MARKER.chars().count()
            + 64;
        if self.transport.max_chars < floor {
            tracing::warn!(max_chars = self.transport.max_chars, floor, "transport.max_chars too small, raised");
            self.transport.max_chars = floor;
        }
    }

    /// Serialize for display, with secrets masked.
    pub fn to_display_toml(&self) -> DigestResult<String> {
        let mut shown = self.clone();
        if shown.narrative.llm.api_key.is_some() {
            shown.narrative.llm.api_key = Some("***".to_string());
        }
        if shown.transport.bot_token.is_some() {
            shown.transport.bot_token = Some("***".to_string());
        }
        toml::to_string_pretty(&shown).map_err(|e| DigestError::Config(e.to_string()))
    }
}
