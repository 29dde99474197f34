use std::path::Path;

use anyhow::{Context, Result};
use chat_digest::delivery::{deliver_chunks, DeliveryChannel, StdoutChannel, TelegramChannel};
use chat_digest::message::RatingChange;
use chat_digest::storage::database::ConnectionRole;

/// Rating changes from a JSON array of `{nickname, rating, delta}`.
fn load_ratings(path: Option<&Path>) -> Result<Vec<RatingChange>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid rating JSON in {}", path.display()))
}

pub fn run(
    config: Option<&Path>,
    chat_id: i64,
    date: Option<&str>,
    ratings: Option<&Path>,
    send: bool,
) -> Result<()> {
    let cfg = super::load_config(config)?;
    let day = super::resolve_date(date)?;
    let ratings = load_ratings(ratings)?;
    let store = super::open_store(&cfg, ConnectionRole::Cli)?;
    let engine = super::build_engine(&cfg);

    let chunks = engine.run(&store, chat_id, day, ratings);

    let channel: Box<dyn DeliveryChannel> = if send {
        Box::new(TelegramChannel::from_config(&cfg.transport)?)
    } else {
        Box::new(StdoutChannel)
    };
    let sent = deliver_chunks(channel.as_ref(), chat_id, &chunks)?;
    if send {
        println!("Sent {} message(s) to chat {}", sent, chat_id);
    }
    Ok(())
}
