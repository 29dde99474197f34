//! Delivery of digest chunks to a chat.

use std::io::Write;
use std::time::Duration;

use crate::config::TransportConfig;
use crate::constants::DELIVERY_TIMEOUT_SECS;
use crate::{DigestError, DigestResult};

pub trait DeliveryChannel {
    fn name(&self) -> &'static str;

    /// Send one already-formatted chunk.
    fn send(&self, chat_id: i64, text: &str) -> DigestResult<()>;
}

/// Telegram Bot API `sendMessage`, HTML parse mode.
pub struct TelegramChannel {
    agent: ureq::Agent,
    endpoint: String,
}

impl TelegramChannel {
    pub fn new(api_base: &str, token: &str) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .timeout_global(Some(Duration::from_secs(DELIVERY_TIMEOUT_SECS)))
                .http_status_as_error(false)
                .build(),
        );
        Self {
            agent,
            endpoint: format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), token),
        }
    }

    /// Requires a bot token in the transport config.
    pub fn from_config(cfg: &TransportConfig) -> DigestResult<Self> {
        let token = cfg
            .bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DigestError::Config("no bot token (set TELEGRAM_BOT_TOKEN)".into()))?;
        Ok(Self::new(&cfg.api_base, token))
    }
}

/// `{"ok": false, "description": ...}` → the description.
fn api_failure(body: &serde_json::Value) -> Option<String> {
    if body.get("ok").and_then(serde_json::Value::as_bool) == Some(true) {
        return None;
    }
    Some(
        body.get("description")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
    )
}

impl DeliveryChannel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn send(&self, chat_id: i64, text: &str) -> DigestResult<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        let mut response = self
            .agent
            .post(&self.endpoint)
            .send_json(&body)
            .map_err(|e| DigestError::Delivery(format!("sendMessage request failed: {}", e)))?;

        let status = response.status().as_u16();
        let reply: serde_json::Value = response.body_mut().read_json().unwrap_or_default();
        match api_failure(&reply) {
            None if status < 400 => Ok(()),
            failure => Err(DigestError::Delivery(format!(
                "sendMessage HTTP {}: {}",
                status,
                failure.unwrap_or_else(|| "unexpected status".into())
            ))),
        }
    }
}

/// Writes chunks to stdout, separated by a rule.
pub struct StdoutChannel;

impl DeliveryChannel for StdoutChannel {
    fn name(&self) -> &'static str {
        "stdout"
    }

    fn send(&self, _chat_id: i64, text: &str) -> DigestResult<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", text)?;
        writeln!(out, "{}", "─".repeat(40))?;
        Ok(())
    }
}

/// Send `chunks` in order. Stops at the first failure, which is logged with
/// the chat and chunk index; nothing is retried here.
pub fn deliver_chunks(channel: &dyn DeliveryChannel, chat_id: i64, chunks: &[String]) -> DigestResult<usize> {
    for (i, chunk) in chunks.iter().enumerate() {
        if let Err(e) = channel.send(chat_id, chunk) {
            tracing::error!(
                chat_id,
                chunk = i + 1,
                of = chunks.len(),
                channel = channel.name(),
                chars = chunk.chars().count(),
                error = %e,
                "Digest delivery failed"
            );
            return Err(DigestError::Delivery(format!(
                "chunk {}/{} to chat {} via {}: {}",
                i + 1,
                chunks.len(),
                chat_id,
                channel.name(),
                e
            )));
        }
    }
    tracing::info!(chat_id, chunks = chunks.len(), channel = channel.name(), "Digest delivered");
    Ok(chunks.len())
}
