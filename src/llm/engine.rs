//! Core `GenerativeEngine` trait, request type and errors.
//!
//! The dispatcher talks to the generative-model server only through
//! [`GenerativeEngine`], so tests can substitute a stub and the production
//! [`OllamaClient`](crate::llm::OllamaClient) stays a thin HTTP adapter.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the generative engine.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within its timeout.
    #[error("request timed out")]
    Timeout,

    /// The engine answered with a non-success HTTP status.
    #[error("engine returned HTTP {0}")]
    Status(u16),

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse engine response: {0}")]
    Parse(String),

    /// The engine returned a response with no usable text content.
    #[error("engine returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else if let Some(status) = e.status() {
            LlmError::Status(status.as_u16())
        } else if e.is_decode() {
            LlmError::Parse(e.to_string())
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// GenerateRequest
// ---------------------------------------------------------------------------

/// One non-streaming completion request.
///
/// Serialises to the `/api/generate` body; `timeout` is transport-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Raw base64 image payloads (no data-URI prefix).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Always `false`; streaming is not supported.
    pub stream: bool,
    #[serde(skip)]
    pub timeout: Duration,
}

impl GenerateRequest {
    /// A text-only completion request.
    pub fn text(model: impl Into<String>, prompt: impl Into<String>, timeout: Duration) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            images: Vec::new(),
            stream: false,
            timeout,
        }
    }

    /// Attach one base64 image to the request.
    pub fn with_image(mut self, image_base64: impl Into<String>) -> Self {
        self.images.push(image_base64.into());
        self
    }
}

// ---------------------------------------------------------------------------
// GenerativeEngine trait
// ---------------------------------------------------------------------------

/// Async interface to a generative-model server.
///
/// Implementors must be `Send + Sync` so they can be shared across request
/// handlers behind an `Arc<dyn GenerativeEngine>`.
#[async_trait]
pub trait GenerativeEngine: Send + Sync {
    /// Run one completion and return the generated text.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError>;

    /// Names of the models the engine currently serves.
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;
}

// ---------------------------------------------------------------------------
// StubEngine  (test-only)
// ---------------------------------------------------------------------------

/// A test double that records every request and replies with a fixed
/// outcome.
#[cfg(test)]
pub struct StubEngine {
    reply: Result<String, LlmError>,
    models: Result<Vec<String>, LlmError>,
    seen: std::sync::Mutex<Vec<GenerateRequest>>,
}

#[cfg(test)]
impl StubEngine {
    /// Always answers `Ok(text)` and lists no models.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            models: Ok(Vec::new()),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Always answers `Err(error)`, including for `list_models`.
    pub fn err(error: LlmError) -> Self {
        Self {
            reply: Err(error.clone()),
            models: Err(error),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.models = Ok(models.iter().map(|m| m.to_string()).collect());
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl GenerativeEngine for StubEngine {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push(request.clone());
        self.reply.clone()
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        self.models.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
