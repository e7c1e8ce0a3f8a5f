//! Claude bridge: the default `GenerationService` over an OpenAI-compatible
//! chat endpoint.
//!
//! The bridge never sees routing decisions or memory internals; the
//! dispatcher and journey runner build a fully grounded prompt before
//! delegating here. API key: `ORACLE_API_KEY`. Default model:
//! `anthropic/claude-3.5-sonnet`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::collaborators::GenerationService;
use crate::error::OracleError;

const API_BASE: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";

/// Standing instruction applied to every generation call. Keeps the voice of
/// the oracle consistent regardless of which component built the prompt.
const ORACLE_SYSTEM_PROMPT: &str = "You are the voice of a contemplative oracle. \
    Speak with warmth and precision. Reflect what the seeker brings rather than \
    prescribing; keep replies short, grounded, and free of clinical language.";

// OpenAI-compatible request/response shapes.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

pub struct ClaudeBridge {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl ClaudeBridge {
    /// Create a bridge from `ORACLE_API_KEY`. Returns `None` when no key is
    /// set, so callers can fall back to a local responder.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("ORACLE_API_KEY").ok()?.trim().to_string();
        if key.is_empty() {
            return None;
        }
        let mut bridge = Self::new(key);
        if let Some(model) = std::env::var("ORACLE_MODEL").ok().filter(|m| !m.trim().is_empty()) {
            bridge = bridge.with_model(model.trim());
        }
        Some(bridge)
    }

    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            model: DEFAULT_MODEL.to_string(),
            client,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, prompt: &str) -> Result<String, OracleError> {
        let url = format!("{API_BASE}/chat/completions");
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: ORACLE_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(0.7),
            max_tokens: Some(1024),
        };

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(OracleError::upstream)?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(OracleError::Upstream(format!(
                "generation API error {status}: {body}"
            )));
        }

        let parsed: ChatResponse = res.json().await.map_err(OracleError::upstream)?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::Upstream("empty choices in generation response".to_string()))
    }
}

#[async_trait]
impl GenerationService for ClaudeBridge {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        self.chat(prompt).await
    }
}
