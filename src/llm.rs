//! Chat-completion client for any OpenAI-compatible server.
//!
//! Two call shapes: free-form text (`complete`, used for SQL synthesis —
//! whatever the model returns is the result, verbatim) and JSON-object mode
//! (`complete_json`, used for chart extraction).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::{ChatError, Result};

/// A chat-completion capability: prompt in, generated text out.
///
/// The pipeline only ever talks to this trait, so tests can substitute a
/// canned completion for the real server.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send a single-user-message prompt, return the response text verbatim.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Same call, but the response is constrained to a single JSON object.
    async fn complete_json(&self, prompt: &str) -> Result<String> {
        self.complete(prompt).await
    }
}

// ─── Request types (OpenAI-compatible) ───────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

pub struct LlmClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    stream: bool,
    max_tokens: u32,
}

impl LlmClient {
    pub fn from_config(cfg: &LlmConfig) -> Self {
        let api_key = cfg.api_key.clone().unwrap_or_default();
        if api_key.is_empty() {
            warn!("No API key configured — completion calls will likely be rejected");
        }

        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("reqwest client"),
            api_key,
            base_url: cfg.base_url.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            stream: cfg.stream,
            max_tokens: cfg.max_tokens,
        }
    }

    async fn call(&self, prompt: &str, response_format: Option<Value>) -> Result<String> {
        let req_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".into(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: self.stream,
            response_format,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("LLM call → {}", url);

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&req_body)
            .send()
            .await
            .map_err(|e| ChatError::Completion(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let truncated: String = body.chars().take(300).collect();
            return Err(ChatError::Completion(format!("HTTP {status}: {truncated}")));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| ChatError::Completion(format!("response parse error: {e}")))?;

        // OpenAI-compatible response format
        let text = data["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        if text.is_empty() {
            return Err(ChatError::Completion("completion returned no text".into()));
        }
        Ok(text)
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.call(prompt, None).await
    }

    async fn complete_json(&self, prompt: &str) -> Result<String> {
        self.call(prompt, Some(serde_json::json!({ "type": "json_object" })))
            .await
    }
}
