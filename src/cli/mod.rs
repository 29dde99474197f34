pub mod chats;
pub mod config;
pub mod daemon;
pub mod ingest;
pub mod summary;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chat_digest::config::DigestConfig;
use chat_digest::digest::DigestEngine;
use chat_digest::narrative::{CircuitBreaker, NarrativeGenerator, NarrativeService, OpenAiService};
use chat_digest::storage::database::ConnectionRole;
use chat_digest::storage::{path_utils, SqliteStore};
use chrono::NaiveDate;

/// Load the config from `explicit` or the default location.
pub fn load_config(explicit: Option<&Path>) -> Result<DigestConfig> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(path_utils::config_path);
    DigestConfig::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}

pub fn open_store(cfg: &DigestConfig, role: ConnectionRole) -> Result<SqliteStore> {
    let path = Path::new(&cfg.storage.db_path);
    SqliteStore::open(path, role)
        .with_context(|| format!("Failed to open message store {}", path.display()))
}

/// Engine with a fresh breaker. The breaker lives as long as the engine,
/// so a tripped remote tier stays off for the rest of the process.
pub fn build_engine(cfg: &DigestConfig) -> DigestEngine {
    let service: Option<Box<dyn NarrativeService>> = if cfg.narrative.llm.enabled {
        Some(Box::new(OpenAiService::from_config(&cfg.narrative.llm)))
    } else {
        None
    };
    let breaker = Arc::new(CircuitBreaker::new());
    let generator = NarrativeGenerator::probe(&cfg.narrative, service, breaker);
    DigestEngine::new(cfg.clone(), generator)
}

/// `YYYY-MM-DD`, or today when absent.
pub fn resolve_date(provided: Option<&str>) -> Result<NaiveDate> {
    match provided {
        Some(s) => chat_digest::time_utils::parse_day(s)
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s)),
        None => Ok(chat_digest::time_utils::today()),
    }
}
