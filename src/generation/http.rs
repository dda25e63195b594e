//! HTTP generation client.
//!
//! Sends `POST {endpoint}` with a JSON body and bearer auth, then pulls the
//! generated text out of whichever common response shape comes back.

use super::{AttemptOutcome, GenerationClient, GenerationError, GenerationRequest};
use crate::config::GenerationConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Generation client backed by an HTTP endpoint.
pub struct HttpGenerationClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl HttpGenerationClient {
    /// Create a client from config and a resolved API key.
    pub fn new(config: &GenerationConfig, api_key: String) -> anyhow::Result<Self> {
        if config.endpoint.trim().is_empty() {
            anyhow::bail!("generation endpoint is required");
        }

        let http = Client::builder()
            .user_agent(concat!("codecritic/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("creating HTTP client: {}", e))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    async fn send(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = json!({
            "model": self.model,
            "prompt": request.prompt,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::Network(e.to_string())
            }
        })?;

        if !(200..300).contains(&status) {
            debug!(status, "generation service returned an error status");
            return Err(GenerationError::from_status(status, &text));
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| GenerationError::InvalidBody(e.to_string()))?;
        extract_text(&value)
            .ok_or_else(|| GenerationError::InvalidBody("no generated text in response".into()))
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> AttemptOutcome {
        match self.send(request).await {
            Ok(text) => AttemptOutcome::Success(text),
            Err(e) => AttemptOutcome::from_error(e),
        }
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Pull generated text out of a response body.
///
/// Accepts `text`, `output`, `response`, `choices[0].text`,
/// `choices[0].message.content` and `candidates[0].content.parts[0].text`.
pub fn extract_text(value: &Value) -> Option<String> {
    const POINTERS: &[&str] = &[
        "/text",
        "/output",
        "/response",
        "/choices/0/text",
        "/choices/0/message/content",
        "/candidates/0/content/parts/0/text",
    ];

    POINTERS
        .iter()
        .filter_map(|p| value.pointer(p))
        .filter_map(Value::as_str)
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}
