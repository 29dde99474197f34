// === Tokenizer ===
pub const MIN_WORD_LENGTH: usize = 4;

// === Topics ===
pub const MAX_TOPICS: usize = 20;
pub const MIN_TOPIC_FREQUENCY: usize = 1;
pub const MAX_RENDERED_TOPICS: usize = 8;
pub const SHOWN_MEMBERS_PER_TOPIC: usize = 5;
pub const MIN_SUMMARY_TEXT_CHARS: usize = 50;

// === No-topics fallback ===
pub const RAW_FALLBACK_MESSAGES: usize = 10;
pub const RAW_FALLBACK_SNIPPET_CHARS: usize = 300;

// === Narrative: LLM tier ===
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";
pub const LLM_NARRATIVE_MAX_TOKENS: u32 = 300;
pub const LLM_TITLE_MAX_TOKENS: u32 = 20;
pub const LLM_NARRATIVE_TEMPERATURE: f32 = 0.7;
pub const LLM_TITLE_TEMPERATURE: f32 = 0.3;
pub const LLM_INPUT_CHAR_BUDGET: usize = 2_000;
pub const LLM_TITLE_INPUT_CHARS: usize = 1_500;
pub const LLM_TITLE_MAX_MESSAGES: usize = 10;
pub const LLM_TIMEOUT_SECS: u64 = 30;

// === Narrative: extractive tier ===
pub const EXTRACTIVE_MIN_SENTENCES: usize = 8;
pub const EXTRACTIVE_MAX_SENTENCES: usize = 15;
pub const EXTRACTIVE_SENTENCES_PER_BLOCK: usize = 4;
pub const EXTRACTIVE_MAX_CHARS: usize = 600;
pub const TEXTRANK_DAMPING: f64 = 0.85;
pub const TEXTRANK_MAX_ITERATIONS: usize = 50;
pub const TEXTRANK_EPSILON: f64 = 1e-6;

// === Narrative: deterministic tier ===
pub const MEANINGFUL_MESSAGE_MIN_CHARS: usize = 15;
pub const FALLBACK_MAX_MESSAGES: usize = 5;
pub const FALLBACK_MAX_CHARS: usize = 500;

// === Summary ===
pub const TOP_ACTIVE_USERS: usize = 10;
pub const ACTIVITY_QUERY_LIMIT: usize = 20;

// === Transport ===
pub const TRANSPORT_MAX_CHARS: usize = 4_096;
pub const TRANSPORT_MAX_CHUNKS: usize = 2;
pub const CONTINUATION_MARKER: &str = "<i>(continued)</i>\n\n";
pub const TRUNCATION_MARKER: &str = "\n\n<i>... (message truncated to fit the transport limit)</i>";
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DELIVERY_TIMEOUT_SECS: u64 = 15;

// === Storage ===
pub const MAX_STORED_MESSAGE_CHARS: usize = 2_000;
pub const SQLITE_BUSY_TIMEOUT_MS: u32 = 5_000;

// === Schedule ===
pub const DEFAULT_SUMMARY_TIME: &str = "23:00";
pub const SCHEDULER_COOLDOWN_SECS: u64 = 60;
