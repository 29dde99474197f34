use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use chat_digest::storage::database::ConnectionRole;
use chat_digest::storage::SqliteStore;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Platform user ids arrive as numbers or strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserId {
    Number(i64),
    Text(String),
}

impl UserId {
    fn into_string(self) -> String {
        match self {
            UserId::Number(n) => n.to_string(),
            UserId::Text(s) => s,
        }
    }
}

/// One input line.
#[derive(Debug, Deserialize)]
struct IngestRecord {
    chat_id: i64,
    user_id: UserId,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    text: String,
    /// Defaults to the time of ingestion.
    #[serde(default)]
    at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct IngestStats {
    counted: usize,
    stored: usize,
    skipped: usize,
}

/// Record every well-formed line; malformed ones are logged and skipped.
fn ingest_lines(store: &SqliteStore, input: impl BufRead) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    for (n, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let record: IngestRecord = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(line = n + 1, error = %e, "Skipping malformed record");
                stats.skipped += 1;
                continue;
            }
        };
        let stored = store.record_message(
            record.chat_id,
            &record.user_id.into_string(),
            record.username.as_deref(),
            record.full_name.as_deref(),
            &record.text,
            record.at.unwrap_or_else(chat_digest::time_utils::now),
        )?;
        stats.counted += 1;
        if stored {
            stats.stored += 1;
        }
    }
    Ok(stats)
}

pub fn run(config: Option<&Path>) -> Result<()> {
    let cfg = super::load_config(config)?;
    let store = super::open_store(&cfg, ConnectionRole::Cli)?;
    let stats = ingest_lines(&store, std::io::stdin().lock())?;
    tracing::info!(counted = stats.counted, stored = stats.stored, skipped = stats.skipped, "Ingest complete");
    println!(
        "Counted {} message(s), stored {} text(s), skipped {} line(s)",
        stats.counted, stats.stored, stats.skipped
    );
    Ok(())
}
