use serde::{Deserialize, Serialize};

/// One chat message as handed to the digest pipeline.
///
/// Immutable once ingested; slices of these are always in occurrence order,
/// which matters for first-mention attribution and for splitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author_id: String,
    pub display_name: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(
        author_id: impl Into<String>,
        display_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            author_id: author_id.into(),
            display_name: display_name.into(),
            text: text.into(),
        }
    }
}

/// Per-user activity for one chat and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivity {
    pub display_name: String,
    pub msg_count: u64,
    pub char_count: u64,
}

/// A player rating movement supplied by an external rating lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingChange {
    pub nickname: String,
    pub rating: i64,
    pub delta: i64,
}
