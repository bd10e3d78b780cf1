use serde::{Deserialize, Serialize};

use cs_domain::error::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Message role on the completion wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message sent to the completion capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A completion request against the backend proxy.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// The ordered messages to send.
    pub messages: Vec<ChatMessage>,
    /// When `true`, the proxy is asked for a single JSON object response.
    pub json_mode: bool,
    /// Sampling temperature. `None` lets the backend choose.
    pub temperature: Option<f32>,
    /// Maximum response tokens. `None` lets the backend choose.
    pub max_tokens: Option<u32>,
    /// Model override. `None` uses the configured default.
    pub model: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Capability trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The text-completion capability the analysis pipeline depends on.
///
/// Implementations must surface failures promptly (network errors,
/// timeouts, malformed upstream responses) rather than hang; the caller
/// treats any failure as "no update".
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one completion request and wait for the full content string.
    async fn complete(&self, req: CompletionRequest) -> Result<String>;

    /// A unique identifier for this client instance.
    fn provider_id(&self) -> &str;
}
