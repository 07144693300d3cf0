//! HTTP gateway in front of a local Ollama server and an in-process
//! Whisper model.
//!
//! - [`config`]: TOML configuration and platform paths.
//! - [`llm`]: generative engine client and prompt assembly.
//! - [`stt`]: audio decoding and speech-to-text.
//! - [`dispatch`]: routes requests to the wired engines.
//! - [`api`]: axum router and handlers.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod llm;
pub mod stt;
