//! Daily scheduler: once a day at `schedule.summary_time`, build the digest
//! of every chat active that day and deliver it to the admin chat.

use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chat_digest::constants::SCHEDULER_COOLDOWN_SECS;
use chat_digest::delivery::{deliver_chunks, DeliveryChannel, TelegramChannel};
use chat_digest::digest::DigestEngine;
use chat_digest::storage::database::{checkpoint_passive, ConnectionRole};
use chat_digest::storage::SqliteStore;
use chat_digest::time_utils;
use chrono::{Local, NaiveDate};

/// Run one scheduled task inside catch_unwind so a panic in one chat's
/// digest does not take the scheduler down.
fn run_task<T>(name: &str, task: impl FnOnce() -> T) -> Option<T> {
    match std::panic::catch_unwind(AssertUnwindSafe(task)) {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::error!("Task '{}' panicked. Scheduler continues.", name);
            None
        }
    }
}

/// Digest every chat active on `day` and send it to `admin_chat_id`.
/// Returns how many digests were delivered; per-chat failures are logged.
fn dispatch_day(
    engine: &DigestEngine,
    store: &SqliteStore,
    channel: &dyn DeliveryChannel,
    admin_chat_id: Option<i64>,
    day: NaiveDate,
) -> usize {
    let Some(admin) = admin_chat_id else {
        tracing::warn!(%day, "No admin chat configured, skipping daily digest");
        return 0;
    };
    let chats = match store.active_chats(day) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(%day, error = %e, "Could not list active chats");
            return 0;
        }
    };
    tracing::info!(%day, chats = chats.len(), admin, "Sending daily digests");

    let mut delivered = 0;
    for chat_id in chats {
        let outcome = run_task("daily digest", || {
            let chunks = engine.run_for_admin(store, chat_id, day, Vec::new());
            deliver_chunks(channel, admin, &chunks)
        });
        match outcome {
            Some(Ok(_)) => delivered += 1,
            Some(Err(e)) => tracing::error!(chat_id, admin, error = %e, "Daily digest not delivered"),
            None => {}
        }
    }
    delivered
}

pub fn run(config: Option<&Path>) -> Result<()> {
    chat_digest::tracing_init::init_daemon_tracing();

    let cfg = super::load_config(config)?;
    let at = time_utils::parse_clock(&cfg.schedule.summary_time)
        .with_context(|| format!("Invalid schedule.summary_time '{}'", cfg.schedule.summary_time))?;
    let channel = TelegramChannel::from_config(&cfg.transport)?;
    let store = super::open_store(&cfg, ConnectionRole::Daemon)?;
    let engine = super::build_engine(&cfg);

    tracing::info!(
        summary_time = %at,
        admin_chat_id = ?cfg.schedule.admin_chat_id,
        tiers = ?engine.generator().tier_names(),
        "Starting digest scheduler"
    );

    loop {
        let now = Local::now().naive_local();
        let next = time_utils::next_occurrence(now, at);
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tracing::info!(next = %next, hours = %format!("{:.1}", wait.as_secs_f64() / 3600.0), "Next daily digest scheduled");
        std::thread::sleep(wait);

        let delivered = dispatch_day(&engine, &store, &channel, cfg.schedule.admin_chat_id, next.date());
        tracing::info!(delivered, "Daily digest run complete");

        if let Err(e) = checkpoint_passive(store.connection()) {
            tracing::warn!(error = %e, "WAL checkpoint failed");
        }
        // Keeps a run that finished within the same minute from firing twice.
        std::thread::sleep(Duration::from_secs(SCHEDULER_COOLDOWN_SECS));
    }
}
