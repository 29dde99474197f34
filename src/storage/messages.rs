use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};

use super::database::{self, ConnectionRole};
use super::{migrations, MessageSource};
use crate::constants::MAX_STORED_MESSAGE_CHARS;
use crate::message::{ChatMessage, UserActivity};
use crate::time_utils;
use crate::{DigestError, DigestResult};

/// SQLite-backed message log plus per-day activity counters.
pub struct SqliteStore {
    conn: Connection,
}

/// Display name: username, else full name, else "Unknown".
pub fn display_name(username: Option<&str>, full_name: Option<&str>) -> String {
    [username, full_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn message_from_row(row: &Row) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        author_id: row.get("author_id")?,
        display_name: row.get("display_name")?,
        text: row.get("text")?,
    })
}

impl SqliteStore {
    pub fn open(path: &Path, role: ConnectionRole) -> DigestResult<Self> {
        let conn = database::open_connection(path, role)?;
        migrations::migrate_messages_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> DigestResult<Self> {
        let conn = database::open_in_memory()?;
        migrations::migrate_messages_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Count the message against its author for the day of `at`, and keep
    /// its text when it has between 1 and `MAX_STORED_MESSAGE_CHARS` chars.
    /// Returns whether the text was stored.
    pub fn record_message(
        &self,
        chat_id: i64,
        user_id: &str,
        username: Option<&str>,
        full_name: Option<&str>,
        text: &str,
        at: DateTime<Utc>,
    ) -> DigestResult<bool> {
        let name = display_name(username, full_name);
        let day = day_key(at.with_timezone(&chrono::Local).date_naive());
        let at_str = time_utils::to_sqlite(&at);
        let len = text.chars().count();

        self.conn
            .execute(
                "INSERT INTO daily_activity (chat_id, day, author_id, display_name, msg_count, char_count, last_message_at)
                 VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)
                 ON CONFLICT(chat_id, day, author_id) DO UPDATE SET
                    display_name = excluded.display_name,
                    msg_count = msg_count + 1,
                    char_count = char_count + excluded.char_count,
                    last_message_at = excluded.last_message_at",
                params![chat_id, day, user_id, name, len as i64, at_str],
            )
            .map_err(|e| DigestError::Storage(format!("Update activity failed: {}", e)))?;

        if len == 0 || len > MAX_STORED_MESSAGE_CHARS {
            tracing::debug!(chat_id, user_id, len, "Message counted, text not stored");
            return Ok(false);
        }

        self.conn
            .execute(
                "INSERT INTO messages (chat_id, author_id, display_name, text, day, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![chat_id, user_id, name, text, day, at_str],
            )
            .map_err(|e| DigestError::Storage(format!("Insert message failed: {}", e)))?;
        Ok(true)
    }

    /// Chats with at least one counted message on `date`.
    pub fn active_chats(&self, date: NaiveDate) -> DigestResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT chat_id FROM daily_activity WHERE day = ?1 ORDER BY chat_id")
            .map_err(|e| DigestError::Storage(e.to_string()))?;
        let ids = stmt
            .query_map(params![day_key(date)], |r| r.get(0))
            .map_err(|e| DigestError::Storage(e.to_string()))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }
}

impl MessageSource for SqliteStore {
    fn messages_for_date(&self, chat_id: i64, date: NaiveDate) -> DigestResult<Vec<ChatMessage>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT author_id, display_name, text FROM messages
                 WHERE chat_id = ?1 AND day = ?2
                 ORDER BY created_at ASC, id ASC",
            )
            .map_err(|e| DigestError::Storage(e.to_string()))?;
        let messages = stmt
            .query_map(params![chat_id, day_key(date)], message_from_row)
            .map_err(|e| DigestError::Storage(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }

    fn daily_activity(
        &self,
        chat_id: i64,
        date: NaiveDate,
        limit: usize,
    ) -> DigestResult<Vec<UserActivity>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT display_name, msg_count, char_count FROM daily_activity
                 WHERE chat_id = ?1 AND day = ?2
                 ORDER BY msg_count DESC, char_count DESC
                 LIMIT ?3",
            )
            .map_err(|e| DigestError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map(params![chat_id, day_key(date), limit as i64], |r| {
                Ok(UserActivity {
                    display_name: r.get(0)?,
                    msg_count: r.get::<_, i64>(1)? as u64,
                    char_count: r.get::<_, i64>(2)? as u64,
                })
            })
            .map_err(|e| DigestError::Storage(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
