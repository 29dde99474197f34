//! Remote chat-completion service behind the first narrative tier.

use std::time::Duration;

use serde::Serialize;

use crate::config::LlmTierConfig;
use crate::error::ServiceError;

/// One completion call: a system instruction plus a user prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

pub trait NarrativeService: Send + Sync {
    /// Checked once when the strategies are probed.
    fn is_available(&self) -> bool;

    fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiService {
    agent: ureq::Agent,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenAiService {
    pub fn from_config(cfg: &LlmTierConfig) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .timeout_global(Some(Duration::from_secs(cfg.timeout_secs)))
                .http_status_as_error(false)
                .build(),
        );
        Self {
            agent,
            endpoint: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
            api_key: cfg.api_key.clone().filter(|k| !k.trim().is_empty()),
        }
    }
}

/// 429 or a body that mentions quota means the account is out of budget.
pub fn classify_failure(status: u16, body: &str) -> ServiceError {
    let snippet: String = body.chars().take(200).collect();
    if status == 429 || body.to_lowercase().contains("quota") {
        ServiceError::QuotaExceeded(format!("HTTP {}: {}", status, snippet))
    } else {
        ServiceError::Transient(format!("HTTP {}: {}", status, snippet))
    }
}

/// `choices[0].message.content`, trimmed.
pub fn parse_completion(body: &serde_json::Value) -> Result<String, ServiceError> {
    body.pointer("/choices/0/message/content")
        .and_then(serde_json::Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Transient("no content in completion response".into()))
}

impl NarrativeService for OpenAiService {
    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        let key = self.api_key.as_deref().ok_or(ServiceError::NotConfigured)?;

        let body = serde_json::json!({
            "model": request.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.prompt},
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("Authorization", &format!("Bearer {}", key))
            .send_json(&body)
            .map_err(|e| ServiceError::Transient(format!("request failed: {}", e)))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let text = response.body_mut().read_to_string().unwrap_or_default();
            let err = classify_failure(status, &text);
            tracing::warn!(status, model = %request.model, error = %err, "Completion request rejected");
            return Err(err);
        }

        let json: serde_json::Value = response
            .body_mut()
            .read_json()
            .map_err(|e| ServiceError::Transient(format!("bad response body: {}", e)))?;
        parse_completion(&json)
    }
}
