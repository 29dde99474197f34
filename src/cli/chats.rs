use std::path::Path;

use anyhow::{Context, Result};
use chat_digest::storage::database::ConnectionRole;

pub fn run(config: Option<&Path>, date: Option<&str>) -> Result<()> {
    let cfg = super::load_config(config)?;
    let day = super::resolve_date(date)?;
    let store = super::open_store(&cfg, ConnectionRole::Cli)?;
    let chats = store.active_chats(day).context("Failed to list active chats")?;

    if chats.is_empty() {
        println!("No active chats on {}", day);
        return Ok(());
    }
    println!("Active chats on {} ({}):", day, chats.len());
    for id in chats {
        println!("  {}", id);
    }
    Ok(())
}
