//! Daily digest pipeline: messages → topics → groups → narratives →
//! document → transport chunks.

pub mod assembler;
pub mod splitter;

use chrono::NaiveDate;

use crate::config::DigestConfig;
use crate::constants::ACTIVITY_QUERY_LIMIT;
use crate::message::{ChatMessage, RatingChange, UserActivity};
use crate::narrative::NarrativeGenerator;
use crate::processing::mentions::MentionCounter;
use crate::processing::{group_by_topic, rank_topics};
use crate::storage::MessageSource;
use crate::time_utils;

pub use assembler::{assemble, DigestSections, Discussion, TopicSection};
pub use splitter::Splitter;

pub struct DigestEngine {
    cfg: DigestConfig,
    generator: NarrativeGenerator,
    mentions: MentionCounter,
    splitter: Splitter,
}

impl DigestEngine {
    pub fn new(cfg: DigestConfig, generator: NarrativeGenerator) -> Self {
        let mentions = MentionCounter::new(&cfg.mentions.patterns);
        let splitter = Splitter::from_config(&cfg.transport);
        Self { cfg, generator, mentions, splitter }
    }

    pub fn generator(&self) -> &NarrativeGenerator {
        &self.generator
    }

    /// Topic blocks, raw listing, or nothing, depending on what the text allows.
    pub fn discussion(&self, messages: &[ChatMessage]) -> Discussion {
        let total_chars: usize = messages.iter().map(|m| m.text.chars().count()).sum();
        if messages.is_empty() || total_chars < self.cfg.topics.min_summary_chars {
            tracing::debug!(messages = messages.len(), total_chars, "Too little text, discussion omitted");
            return Discussion::Omitted;
        }

        let topics = rank_topics(messages, self.cfg.topics.max_topics, self.cfg.topics.min_frequency);
        let groups = group_by_topic(messages, &topics);
        if groups.is_empty() {
            tracing::info!(messages = messages.len(), "No topics found, listing messages");
            return Discussion::Raw(messages.to_vec());
        }

        // Narratives run one group at a time; the remote tier is rate limited.
        let sections = groups
            .iter()
            .take(self.cfg.topics.max_rendered)
            .map(|g| TopicSection {
                narrative: self.generator.generate(g, &topics),
                first_mentioner: g.first_mentioner.clone(),
                member_count: g.members.len(),
            })
            .collect();
        Discussion::Topics(sections)
    }

    /// Render one chat's day from already-loaded inputs.
    pub fn compose(
        &self,
        date: NaiveDate,
        is_today: bool,
        messages: &[ChatMessage],
        activity: Vec<UserActivity>,
        ratings: Vec<RatingChange>,
    ) -> String {
        let mentions = if self.mentions.is_empty() || messages.is_empty() {
            None
        } else {
            Some((self.cfg.mentions.label.clone(), self.mentions.count(messages)))
        };

        let sections = DigestSections {
            date,
            is_today,
            activity,
            ratings,
            discussion: self.discussion(messages),
            mentions,
        };
        let doc = assemble(&sections, &self.cfg.topics);
        tracing::info!(
            date = %date,
            messages = messages.len(),
            chars = doc.chars().count(),
            "Digest assembled"
        );
        doc
    }

    /// Load the day from `source` and render it. Read failures degrade to an
    /// empty section rather than aborting the digest.
    pub fn build_document(
        &self,
        source: &dyn MessageSource,
        chat_id: i64,
        date: NaiveDate,
        ratings: Vec<RatingChange>,
    ) -> String {
        let activity = source
            .daily_activity(chat_id, date, ACTIVITY_QUERY_LIMIT)
            .unwrap_or_else(|e| {
                tracing::warn!(chat_id, error = %e, "Daily activity unavailable");
                Vec::new()
            });
        let messages = source.messages_for_date(chat_id, date).unwrap_or_else(|e| {
            tracing::warn!(chat_id, error = %e, "Messages unavailable");
            Vec::new()
        });
        self.compose(date, date == time_utils::today(), &messages, activity, ratings)
    }

    /// `build_document`, split into transport-sized chunks.
    pub fn run(
        &self,
        source: &dyn MessageSource,
        chat_id: i64,
        date: NaiveDate,
        ratings: Vec<RatingChange>,
    ) -> Vec<String> {
        let doc = self.build_document(source, chat_id, date, ratings);
        self.splitter.split(&doc)
    }

    /// `run` for a reader who gets several chats' digests in one place: the
    /// first chunk names the source chat.
    pub fn run_for_admin(
        &self,
        source: &dyn MessageSource,
        chat_id: i64,
        date: NaiveDate,
        ratings: Vec<RatingChange>,
    ) -> Vec<String> {
        let doc = self.build_document(source, chat_id, date, ratings);
        self.splitter.split_prefixed(&doc, &source_header(chat_id))
    }
}

pub fn source_header(chat_id: i64) -> String {
    format!("📊 <b>Digest for chat {}</b>\n\n", chat_id)
}
