//! `OllamaClient`: [`GenerativeEngine`] over Ollama's native HTTP API.
//!
//! Only two endpoints are used: `GET /api/tags` (model listing) and
//! `POST /api/generate` in non-streaming mode.  All connection details come
//! from [`OllamaConfig`]; timeouts are applied per request because text and
//! image calls have different budgets.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::OllamaConfig;
use crate::llm::engine::{GenerateRequest, GenerativeEngine, LlmError};

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    #[serde(default)]
    name: String,
}

/// HTTP client for a locally hosted Ollama server.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
}

impl OllamaClient {
    /// Build a client from gateway config.  A trailing `/` on the base URL
    /// is ignored.
    pub fn from_config(config: &OllamaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            probe_timeout: config.probe_timeout(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerativeEngine for OllamaClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        log::debug!(
            "POST {url} model={} prompt_len={} images={}",
            request.model,
            request.prompt.len(),
            request.images.len()
        );

        let response = self
            .client
            .post(&url)
            .timeout(request.timeout)
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        match body.response {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(LlmError::EmptyResponse),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(LlmError::Status(response.status().as_u16()));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        log::debug!("Ollama lists {} model(s)", tags.models.len());

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
