//! Adapter for the backend chat proxy.
//!
//! The proxy exposes `POST {base_url}/api/chat` taking
//! `{ "messages": [...], "jsonMode": bool }` and answering with the
//! OpenAI chat-completions shape; only `choices[0].message.content` is
//! consumed here.

use serde_json::Value;

use cs_domain::config::LlmConfig;
use cs_domain::error::{Error, Result};

use crate::traits::{CompletionClient, CompletionRequest};
use crate::util::from_reqwest;

/// HTTP client for the backend chat proxy.
pub struct ChatProxyClient {
    id: String,
    chat_url: String,
    default_model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl ChatProxyClient {
    /// Build a client from the deserialized LLM config section.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let base = cfg.base_url.trim_end_matches('/');
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: "chat-proxy".into(),
            chat_url: format!("{base}/api/chat"),
            default_model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            client,
        })
    }

    fn build_body(&self, req: &CompletionRequest) -> Value {
        let mut body = serde_json::json!({
            "messages": req.messages,
            "jsonMode": req.json_mode,
            "model": req.model.clone().unwrap_or_else(|| self.default_model.clone()),
        });
        if let Some(temp) = req.temperature.or(self.temperature) {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max) = req.max_tokens.or(self.max_tokens) {
            body["max_tokens"] = serde_json::json!(max);
        }
        body
    }
}

#[async_trait::async_trait]
impl CompletionClient for ChatProxyClient {
    async fn complete(&self, req: CompletionRequest) -> Result<String> {
        let body = self.build_body(&req);
        tracing::debug!(
            url = %self.chat_url,
            json_mode = req.json_mode,
            messages = req.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.chat_url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!(
                "proxy returned {status}: {detail}"
            )));
        }

        let payload: Value = response.json().await.map_err(from_reqwest)?;
        extract_content(&payload)
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

/// Pull `choices[0].message.content` out of a chat-completions payload.
fn extract_content(payload: &Value) -> Result<String> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| Error::Provider("invalid response format from proxy".into()))
}
