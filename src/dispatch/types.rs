//! Request and result shapes handled by the [`Dispatcher`](crate::dispatch::Dispatcher).

use serde::{Deserialize, Serialize};

use crate::llm::context::null_as_default;
use crate::llm::Turn;

/// One `/chat` request.
///
/// Field names follow the web client (`image_base64`,
/// `conversation_history`); the shorter `image` and `history` are accepted
/// as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,

    /// Raw base64 or a `data:` URI.  An empty string counts as absent.
    #[serde(default, alias = "image")]
    pub image_base64: Option<String>,

    #[serde(
        default,
        alias = "history",
        deserialize_with = "null_as_default"
    )]
    pub conversation_history: Vec<Turn>,

    /// Text model override.  Ignored for image requests.
    #[serde(default)]
    pub model: Option<String>,
}

impl ChatRequest {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// The image payload, if present and non-empty.
    pub fn image(&self) -> Option<&str> {
        self.image_base64.as_deref().filter(|s| !s.is_empty())
    }

    /// The requested text model, if present and non-empty.
    pub fn requested_model(&self) -> Option<&str> {
        self.model.as_deref().filter(|s| !s.is_empty())
    }
}

/// Which path produced a [`ChatResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    ImageAnalysis,
    TextChat,
}

/// Normalised `/chat` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    pub response: String,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

/// Result of probing the generative engine for `GET /`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub ollama_running: bool,
    pub llava_available: bool,
}
