use crate::{DigestError, DigestResult};
use rusqlite::Connection;

pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Current schema version (0 when the version table is absent).
pub fn get_schema_version(conn: &Connection) -> DigestResult<u32> {
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |r| r.get(0),
        )
        .map_err(|e| DigestError::Storage(e.to_string()))?;

    if !exists {
        return Ok(0);
    }

    let version: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .map_err(|e| DigestError::Storage(e.to_string()))?;

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: u32) -> DigestResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        rusqlite::params![version],
    )
    .map_err(|e| DigestError::Storage(e.to_string()))?;
    Ok(())
}

const MESSAGES_V1: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id INTEGER NOT NULL,
    author_id TEXT NOT NULL,
    display_name TEXT NOT NULL,
    text TEXT NOT NULL,
    day TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_messages_chat_day ON messages(chat_id, day);
";

// V2: per-user counters, so the stats block does not rescan message text.
const MESSAGES_V2: &str = "
CREATE TABLE IF NOT EXISTS daily_activity (
    chat_id INTEGER NOT NULL,
    day TEXT NOT NULL,
    author_id TEXT NOT NULL,
    display_name TEXT NOT NULL,
    msg_count INTEGER NOT NULL DEFAULT 0,
    char_count INTEGER NOT NULL DEFAULT 0,
    last_message_at TEXT,
    PRIMARY KEY (chat_id, day, author_id)
);
";

pub fn migrate_messages_db(conn: &Connection) -> DigestResult<()> {
    let version = get_schema_version(conn)?;

    if version < 1 {
        conn.execute_batch(MESSAGES_V1)
            .map_err(|e| DigestError::Storage(format!("Messages DB V1 migration failed: {}", e)))?;
        set_schema_version(conn, 1)?;
    }

    if version < 2 {
        conn.execute_batch(MESSAGES_V2)
            .map_err(|e| DigestError::Storage(format!("Messages DB V2 migration failed: {}", e)))?;
        // Backfill counters from messages stored before V2.
        conn.execute(
            "INSERT OR IGNORE INTO daily_activity (chat_id, day, author_id, display_name, msg_count, char_count, last_message_at)
             SELECT chat_id, day, author_id, MAX(display_name), COUNT(*), SUM(LENGTH(text)), MAX(created_at)
             FROM messages GROUP BY chat_id, day, author_id",
            [],
        )
        .map_err(|e| DigestError::Storage(format!("Messages DB V2 backfill failed: {}", e)))?;
        set_schema_version(conn, 2)?;
    }

    if version > 0 && version < CURRENT_SCHEMA_VERSION {
        tracing::info!(from = version, to = CURRENT_SCHEMA_VERSION, "Messages DB migrated");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::open_in_memory;

    #[test]
    fn test_fresh_db_reaches_current_version() {
        let conn = open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);
        migrate_messages_db(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_migration_is_idempotent() {
        let conn = open_in_memory().unwrap();
        migrate_messages_db(&conn).unwrap();
        migrate_messages_db(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_v2_backfills_activity() {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(MESSAGES_V1).unwrap();
        set_schema_version(&conn, 1).unwrap();
        conn.execute(
            "INSERT INTO messages (chat_id, author_id, display_name, text, day, created_at)
             VALUES (1, 'u1', 'Ann', 'hello', '2026-10-16', '2026-10-16T10:00:00+00:00')",
            [],
        )
        .unwrap();

        migrate_messages_db(&conn).unwrap();
        let (count, chars): (i64, i64) = conn
            .query_row(
                "SELECT msg_count, char_count FROM daily_activity WHERE author_id = 'u1'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!((count, chars), (1, 5));
    }
}
