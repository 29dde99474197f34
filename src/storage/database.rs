use crate::constants::SQLITE_BUSY_TIMEOUT_MS;
use crate::{DigestError, DigestResult};
use rusqlite::Connection;

/// Who holds the connection. The long-running scheduler keeps one open for
/// days and checkpoints the WAL itself; one-shot commands leave it to SQLite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRole {
    Daemon,
    Cli,
}

/// Open a SQLite connection with the pragmas for `role`, creating parent dirs.
pub fn open_connection(path: &std::path::Path, role: ConnectionRole) -> DigestResult<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)
        .map_err(|e| DigestError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), role = ?role, "Database connection opened");

    configure(&conn, role)?;
    Ok(conn)
}

/// In-memory connection with the same schema, for tests and dry runs.
pub fn open_in_memory() -> DigestResult<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA temp_store = MEMORY;")
        .map_err(|e| DigestError::Storage(format!("Failed to configure pragmas: {}", e)))?;
    Ok(conn)
}

fn configure(conn: &Connection, role: ConnectionRole) -> DigestResult<()> {
    let autocheckpoint = match role {
        ConnectionRole::Daemon => 1000,
        ConnectionRole::Cli => 0,
    };
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = {};
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA temp_store = MEMORY;
         PRAGMA wal_autocheckpoint = {};",
        SQLITE_BUSY_TIMEOUT_MS, autocheckpoint,
    ))
    .map_err(|e| DigestError::Storage(format!("Failed to configure pragmas: {}", e)))?;
    Ok(())
}

/// PASSIVE checkpoint, run by the daemon after each digest.
pub fn checkpoint_passive(conn: &Connection) -> DigestResult<()> {
    conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")
        .map_err(|e| DigestError::Storage(format!("WAL checkpoint failed: {}", e)))?;
    Ok(())
}
