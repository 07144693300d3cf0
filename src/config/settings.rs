//! Gateway settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across
//! request handlers.  Every struct is `#[serde(default)]`, so a settings
//! file only needs the keys it overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the gateway binds to.
    pub bind_address: String,
    /// Browser origins allowed to call the gateway (credentials included).
    pub cors_allowed_origins: Vec<String>,
    /// Largest accepted request body in bytes, for both audio uploads and
    /// JSON chat bodies carrying inline base64 images.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".into(),
            cors_allowed_origins: vec![
                "http://localhost:5173".into(),
                "http://localhost:3000".into(),
                "http://localhost:5174".into(),
            ],
            max_body_bytes: 100 * 1024 * 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// OllamaConfig
// ---------------------------------------------------------------------------

/// Settings for the generative-model server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Base URL of the Ollama HTTP API.
    pub base_url: String,
    /// Model used for text chat when the request names none.
    pub text_model: String,
    /// Vision-capable model used for every image request.
    pub vision_model: String,
    /// Seconds to wait for a text completion.
    pub text_timeout_secs: u64,
    /// Seconds to wait for an image description.
    pub vision_timeout_secs: u64,
    /// Seconds to wait for the `/api/tags` health probe.
    pub probe_timeout_secs: u64,
    /// Wire the image-description path into the dispatcher.
    pub vision_enabled: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".into(),
            text_model: "mistral:7b".into(),
            vision_model: "llava:latest".into(),
            text_timeout_secs: 60,
            vision_timeout_secs: 120,
            probe_timeout_secs: 5,
            vision_enabled: true,
        }
    }
}

impl OllamaConfig {
    pub fn text_timeout(&self) -> Duration {
        Duration::from_secs(self.text_timeout_secs)
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_secs(self.vision_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Model family of the vision model: the name without its `:tag`
    /// (`"llava:latest"` → `"llava"`).
    pub fn vision_family(&self) -> &str {
        self.vision_model
            .split_once(':')
            .map_or(self.vision_model.as_str(), |(family, _)| family)
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the in-process Whisper engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Load the speech engine and expose `/transcribe`.
    pub enabled: bool,
    /// Path to the GGML model file.
    pub model_path: PathBuf,
    /// ISO-639-1 language code, or `"auto"` for Whisper's detection.
    pub language: String,
    /// Beam-search width; 1 or less decodes greedily.
    pub beam_size: i32,
    /// CPU threads handed to Whisper; `None` picks a value from the host.
    pub n_threads: Option<i32>,
    /// ffmpeg executable used to decode uploads to 16 kHz mono PCM.
    pub ffmpeg_bin: String,
    /// Directory for upload scratch files; `None` means the system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_path: AppPaths::new().models_dir.join("ggml-base.bin"),
            language: "auto".into(),
            beam_size: 5,
            n_threads: None,
            ffmpeg_bin: "ffmpeg".into(),
            scratch_dir: None,
        }
    }
}

impl SttConfig {
    /// Resolved scratch directory for uploaded audio.
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

// ---------------------------------------------------------------------------
// ContextConfig
// ---------------------------------------------------------------------------

/// Conversation-context window applied to text chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Number of trailing turns flattened into the prompt.
    pub max_turns: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { max_turns: 10 }
    }
}

// ---------------------------------------------------------------------------
// GatewayConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level gateway configuration, serialised as `gateway.toml`.
///
/// ```rust,no_run
/// use chatbot_gateway::config::GatewayConfig;
///
/// // Load (returns Default when the file is missing)
/// let config = GatewayConfig::load().unwrap();
/// println!("{}", config.server.bind_address);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Generative-model server settings.
    pub ollama: OllamaConfig,
    /// Speech-to-text settings.
    pub stt: SttConfig,
    /// Conversation-context settings.
    pub context: ContextConfig,
}

impl GatewayConfig {
    /// Load configuration from the platform-appropriate `gateway.toml`.
    ///
    /// Returns `Ok(GatewayConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
