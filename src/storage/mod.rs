pub mod database;
pub mod messages;
pub mod migrations;
pub mod path_utils;

use chrono::NaiveDate;

use crate::message::{ChatMessage, UserActivity};
use crate::DigestResult;

pub use messages::SqliteStore;

/// Where the digest reads a chat's day from.
pub trait MessageSource {
    /// Messages of `chat_id` on `date`, in occurrence order.
    fn messages_for_date(&self, chat_id: i64, date: NaiveDate) -> DigestResult<Vec<ChatMessage>>;

    /// Per-user counters for `date`, most active first, at most `limit` rows.
    fn daily_activity(
        &self,
        chat_id: i64,
        date: NaiveDate,
        limit: usize,
    ) -> DigestResult<Vec<UserActivity>>;
}
