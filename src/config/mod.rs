//! Configuration module for the chatbot gateway.
//!
//! Provides `GatewayConfig` (top-level settings), sub-configs for each
//! subsystem, `AppPaths` for cross-platform data directories, and TOML
//! persistence via `GatewayConfig::load` / `GatewayConfig::save_to`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{ContextConfig, GatewayConfig, OllamaConfig, ServerConfig, SttConfig};
