//! Cross-platform gateway paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\chatbot-gateway\
//!   macOS:   ~/Library/Application Support/chatbot-gateway/
//!   Linux:   ~/.config/chatbot-gateway/
//!
//! Data dir (speech models):
//!   Windows: %LOCALAPPDATA%\chatbot-gateway\
//!   macOS:   ~/Library/Application Support/chatbot-gateway/
//!   Linux:   ~/.local/share/chatbot-gateway/

use std::path::PathBuf;

/// Holds all resolved gateway directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `gateway.toml`.
    pub config_dir: PathBuf,
    /// Full path to `gateway.toml`.
    pub settings_file: PathBuf,
    /// Directory for GGML speech model files.
    pub models_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "chatbot-gateway";

    /// Resolves all paths using the `dirs` crate, falling back to the
    /// current directory when the platform has no standard location.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self {
            settings_file: config_dir.join("gateway.toml"),
            config_dir,
            models_dir: data_dir.join("models"),
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
