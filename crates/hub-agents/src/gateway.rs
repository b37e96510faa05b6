//! Text-generation gateway.
//!
//! Every agent step consumes the same stateless capability: send a preamble
//! plus a prompt, get back either structured JSON (intake, classifier,
//! escalation) or free text (the resolver's answer draft). The capability is
//! a trait so the engine takes it as an injected dependency and tests can
//! substitute doubles; [`OpenAiGateway`] is the production implementation
//! speaking the OpenAI-compatible chat-completions wire shape.
//!
//! A gateway failure is fatal to the calling step — no fallback answer is
//! fabricated from a failed call.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GatewayEndpoint;

/// Errors from the text-generation gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("gateway returned an empty response")]
    EmptyResponse,

    #[error("gateway output is not valid JSON: {0}")]
    Malformed(String),
}

/// Stateless request/response text generation.
#[async_trait]
pub trait TextGateway: Send + Sync {
    /// Generate structured output; the preamble must instruct the model to
    /// return a single JSON object.
    async fn generate_json(
        &self,
        preamble: &str,
        prompt: &str,
    ) -> Result<serde_json::Value, GatewayError>;

    /// Generate free text (the resolver's answer draft).
    async fn generate_text(&self, preamble: &str, prompt: &str) -> Result<String, GatewayError>;
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiGateway {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiGateway {
    /// Build a gateway client from an endpoint config.
    ///
    /// The request timeout bounds every agent call; a timed-out generation
    /// surfaces as `GatewayError::Http` and is fatal to the calling step.
    pub fn new(endpoint: &GatewayEndpoint, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        Ok(Self {
            http,
            url: format!("{}/chat/completions", endpoint.url.trim_end_matches('/')),
            api_key: endpoint.api_key.clone(),
            model: endpoint.model.clone(),
            temperature: 0.3,
        })
    }

    async fn chat(
        &self,
        preamble: &str,
        prompt: &str,
        json_mode: bool,
    ) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: preamble.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            response_format: json_mode.then_some(ResponseFormat {
                format: "json_object",
            }),
        };

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status, body });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let content = chat
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(content)
    }
}

#[async_trait]
impl TextGateway for OpenAiGateway {
    async fn generate_json(
        &self,
        preamble: &str,
        prompt: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        let content = self.chat(preamble, prompt, true).await?;
        parse_json_payload(&content)
    }

    async fn generate_text(&self, preamble: &str, prompt: &str) -> Result<String, GatewayError> {
        let content = self.chat(preamble, prompt, false).await?;
        Ok(content.trim().to_string())
    }
}

/// Parse a model response into a JSON value, tolerating surrounding prose
/// or code fences by falling back to the outermost brace span.
fn parse_json_payload(content: &str) -> Result<serde_json::Value, GatewayError> {
    let trimmed = content.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(GatewayError::Malformed(format!(
        "no JSON object in response ({} chars)",
        trimmed.len()
    )))
}
