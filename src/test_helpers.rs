//! Shared test utilities: message builders, fake services, fake channels.
//!
//! Available only under `#[cfg(test)]`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::delivery::DeliveryChannel;
use crate::error::ServiceError;
use crate::message::{ChatMessage, UserActivity};
use crate::narrative::service::{CompletionRequest, NarrativeService};
use crate::processing::{GroupMember, Topic, TopicGroup};
use crate::storage::MessageSource;
use crate::{DigestError, DigestResult};

// ============================================================================
// Messages and groups
// ============================================================================

pub fn msg(author_id: &str, name: &str, text: &str) -> ChatMessage {
    ChatMessage::new(author_id, name, text)
}

pub struct MessageBuilder {
    messages: Vec<ChatMessage>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self { messages: Vec::new() }
    }

    /// Author id is derived from the name.
    pub fn say(mut self, name: &str, text: &str) -> Self {
        let id = format!("id-{}", name.to_lowercase());
        self.messages.push(ChatMessage::new(id, name, text));
        self
    }

    /// `count` messages from `name`, each `"{prefix} {i}"`.
    pub fn repeat(mut self, name: &str, prefix: &str, count: usize) -> Self {
        for i in 0..count {
            self = self.say(name, &format!("{} {}", prefix, i));
        }
        self
    }

    pub fn build(self) -> Vec<ChatMessage> {
        self.messages
    }
}

pub fn topic(keyword: &str, frequency: usize) -> Topic {
    Topic { keyword: keyword.to_string(), frequency }
}

/// Group for `keyword` whose first member is the first mentioner.
pub fn group(keyword: &str, members: &[(&str, &str)]) -> TopicGroup {
    TopicGroup {
        topic: topic(keyword, members.len()),
        first_mentioner: members.first().map(|(n, _)| n.to_string()).unwrap_or_default(),
        members: members
            .iter()
            .map(|(name, text)| GroupMember {
                display_name: name.to_string(),
                text: text.to_string(),
            })
            .collect(),
    }
}

// ============================================================================
// ScriptedService
// ============================================================================

/// Shared call counter handed out before the service is boxed.
#[derive(Clone, Default)]
pub struct CallCount(Arc<AtomicUsize>);

impl CallCount {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Narrative service replaying canned replies in order. Runs out → transient error.
pub struct ScriptedService {
    replies: Mutex<VecDeque<Result<String, ServiceError>>>,
    calls: CallCount,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedService {
    pub fn new(replies: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: CallCount::default(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> CallCount {
        self.calls.clone()
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl NarrativeService for ScriptedService {
    fn is_available(&self) -> bool {
        true
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        self.calls.0.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Transient("script exhausted".into())))
    }
}

// ============================================================================
// MemorySource
// ============================================================================

/// In-memory message source: one day, one chat.
#[derive(Default)]
pub struct MemorySource {
    pub messages: Vec<ChatMessage>,
    pub activity: Vec<UserActivity>,
}

impl MemorySource {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        let mut activity: Vec<UserActivity> = Vec::new();
        for m in &messages {
            match activity.iter_mut().find(|a| a.display_name == m.display_name) {
                Some(a) => {
                    a.msg_count += 1;
                    a.char_count += m.text.chars().count() as u64;
                }
                None => activity.push(UserActivity {
                    display_name: m.display_name.clone(),
                    msg_count: 1,
                    char_count: m.text.chars().count() as u64,
                }),
            }
        }
        activity.sort_by(|a, b| b.msg_count.cmp(&a.msg_count).then(b.char_count.cmp(&a.char_count)));
        Self { messages, activity }
    }
}

impl MessageSource for MemorySource {
    fn messages_for_date(&self, _chat_id: i64, _date: NaiveDate) -> DigestResult<Vec<ChatMessage>> {
        Ok(self.messages.clone())
    }

    fn daily_activity(&self, _chat_id: i64, _date: NaiveDate, limit: usize) -> DigestResult<Vec<UserActivity>> {
        Ok(self.activity.iter().take(limit).cloned().collect())
    }
}

// ============================================================================
// RecordingChannel
// ============================================================================

/// Delivery channel that records what it was given. `fail_at` makes the
/// n-th send (0-based) fail.
#[derive(Default)]
pub struct RecordingChannel {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub fail_at: Option<usize>,
}

impl RecordingChannel {
    pub fn failing_at(index: usize) -> Self {
        Self { fail_at: Some(index), ..Self::default() }
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }
}

impl DeliveryChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn send(&self, chat_id: i64, text: &str) -> DigestResult<()> {
        let mut sent = self.sent.lock().unwrap();
        if self.fail_at == Some(sent.len()) {
            return Err(DigestError::Delivery("scripted failure".into()));
        }
        sent.push((chat_id, text.to_string()));
        Ok(())
    }
}
