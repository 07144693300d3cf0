//! Generative-engine module.
//!
//! This module provides:
//! * [`GenerativeEngine`]: async trait implemented by all engine backends.
//! * [`OllamaClient`]: Ollama native-API backend (`/api/generate`, `/api/tags`).
//! * [`GenerateRequest`]: one non-streaming completion request.
//! * [`ContextAssembler`] / [`Turn`]: flattens client-supplied history into a prompt.
//! * [`LlmError`]: error variants for engine calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use chatbot_gateway::config::OllamaConfig;
//! use chatbot_gateway::llm::{ContextAssembler, GenerateRequest, GenerativeEngine, OllamaClient, Turn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = OllamaClient::from_config(&OllamaConfig::default());
//!     let prompt = ContextAssembler::default()
//!         .build_prompt(&[Turn::new("hi", "hello!")], "what's new?");
//!
//!     let request = GenerateRequest::text("mistral:7b", prompt, Duration::from_secs(60));
//!     println!("{}", engine.generate(&request).await.unwrap());
//! }
//! ```

pub mod context;
pub mod engine;
pub mod ollama;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use context::{ContextAssembler, Turn, DEFAULT_MAX_TURNS};
pub use engine::{GenerateRequest, GenerativeEngine, LlmError};
pub use ollama::OllamaClient;

#[cfg(test)]
pub use engine::StubEngine;
