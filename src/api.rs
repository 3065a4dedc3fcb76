//! Text-generation API client.
//!
//! This module talks to an OpenAI-compatible chat-completions endpoint. It
//! uses a trait-based design so the summarizer can be exercised against a
//! scripted fake in tests:
//! - [`ChatApi`]: core trait defining one generation request
//! - [`OpenAiClient`]: reqwest-backed implementation
//!
//! Each call is a single attempt. The summarizer absorbs failures into
//! per-asset fallback text, so there is deliberately no retry layer here.

use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Trait for a single synchronous text-generation request.
///
/// Implementors send a system instruction and user prompt to a model and
/// return the generated text.
pub trait ChatApi {
    /// Request one completion.
    ///
    /// # Arguments
    ///
    /// * `system` - The system instruction framing the model's role
    /// * `user` - The user prompt (template plus article content)
    /// * `temperature` - Sampling temperature (0.0 deterministic, 0.85 creative)
    ///
    /// # Returns
    ///
    /// The generated text, or an error if the request failed.
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, Box<dyn Error>>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ResponseChoice>,
}

/// Client for an OpenAI-compatible chat-completions API.
///
/// Holds a pooled HTTP client plus the endpoint, key, and model identifier
/// sent with every request.
#[derive(Debug)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client for the given endpoint and model.
    ///
    /// `api_base` is the versioned API root, e.g. `https://api.openai.com/v1`;
    /// a trailing slash is tolerated.
    pub fn new(api_base: &str, api_key: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

impl ChatApi for OpenAiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model, temperature))]
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, Box<dyn Error>> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
        };

        let t0 = Instant::now();
        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let dt = t0.elapsed();

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                %status,
                elapsed_ms = dt.as_millis(),
                body_preview = %truncate_for_log(&body, 300),
                "Chat completion request failed"
            );
            return Err(format!("chat completion failed: {status} - {body}").into());
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or("chat completion returned no choices")?;

        debug!(
            elapsed_ms = dt.as_millis(),
            bytes = content.len(),
            "Chat completion succeeded"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You summarize news articles about crypto into a script for a podcast.",
                },
                ChatMessage {
                    role: "user",
                    content: "Summarize: some article",
                },
            ],
            temperature: 0.0,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "A summary."},
                    "finish_reason": "stop"
                }
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;

        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices.len(), 1);
        assert_eq!(parsed.choices[0].message.content, "A summary.");
    }

    #[test]
    fn test_empty_choices() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let client = OpenAiClient::new("https://api.openai.com/v1/", "sk-test", "gpt-3.5-turbo");
        assert_eq!(client.api_base, "https://api.openai.com/v1");
    }
}
