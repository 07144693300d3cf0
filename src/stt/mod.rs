//! STT (Speech-to-Text) module.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  TranscriptionAdapter                   │
//! │                                                         │
//! │  bytes ─▶ scratch file ─▶ AudioDecoder ─▶ SttEngine     │
//! │           (NamedTempFile)  (ffmpeg)       (WhisperEngine)│
//! │                                               │         │
//! │                                               ▼         │
//! │                                   TranscriptionResult   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chatbot_gateway::config::SttConfig;
//! use chatbot_gateway::stt::{TranscribeParams, TranscriptionAdapter, WhisperEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SttConfig::default();
//!     let engine = WhisperEngine::load(&config.model_path, TranscribeParams::from_config(&config))
//!         .expect("model not found");
//!     let adapter = TranscriptionAdapter::from_config(Arc::new(engine), &config);
//!
//!     let audio = std::fs::read("note.webm").unwrap();
//!     let result = adapter.transcribe(audio, Some("note.webm")).await.unwrap();
//!     println!("{}", result.text);
//! }
//! ```

pub mod adapter;
pub mod decode;
pub mod engine;
pub mod transcribe;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use adapter::TranscriptionAdapter;
pub use decode::{AudioDecoder, FfmpegDecoder, WHISPER_SAMPLE_RATE};
pub use engine::{SttEngine, SttError, WhisperEngine};
pub use transcribe::{SamplingStrategy, Segment, TranscribeParams, Transcript, TranscriptionResult};

#[cfg(test)]
pub use engine::MockSttEngine;
