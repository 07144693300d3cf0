//! Request dispatcher: the single entry point behind every HTTP route.
//!
//! # Flow
//!
//! ```text
//! ChatRequest
//!   ├─ image present ─▶ strip data-URI ─▶ vision engine (vision_model, 120 s)
//!   │                                        └─▶ ChatResult { kind: ImageAnalysis }
//!   └─ text only ────▶ ContextAssembler ─▶ text engine (model or default, 60 s)
//!                                            └─▶ ChatResult { kind: TextChat }
//! ```
//!
//! Capabilities are opt-in: a dispatcher always has a text engine, and the
//! vision path and transcription adapter are wired with
//! [`Dispatcher::with_vision`] / [`Dispatcher::with_transcription`].
//! Calls are made once; there are no retries.

use std::sync::Arc;

use crate::config::{GatewayConfig, OllamaConfig};
use crate::dispatch::error::GatewayError;
use crate::dispatch::types::{ChatKind, ChatRequest, ChatResult, EngineStatus};
use crate::llm::{ContextAssembler, GenerateRequest, GenerativeEngine};
use crate::stt::{TranscriptionAdapter, TranscriptionResult};

/// Prompt used when an image arrives with an empty message.
pub const DEFAULT_IMAGE_PROMPT: &str = "Describe this image in detail.";

/// Routes chat, image and transcription requests to the wired engines.
pub struct Dispatcher {
    ollama: OllamaConfig,
    assembler: ContextAssembler,
    text: Arc<dyn GenerativeEngine>,
    vision: Option<Arc<dyn GenerativeEngine>>,
    transcriber: Option<TranscriptionAdapter>,
}

impl Dispatcher {
    /// A text-only dispatcher.
    pub fn new(config: &GatewayConfig, text: Arc<dyn GenerativeEngine>) -> Self {
        Self {
            ollama: config.ollama.clone(),
            assembler: ContextAssembler::new(config.context.max_turns),
            text,
            vision: None,
            transcriber: None,
        }
    }

    /// Enable image description through `engine`.
    pub fn with_vision(mut self, engine: Arc<dyn GenerativeEngine>) -> Self {
        self.vision = Some(engine);
        self
    }

    /// Enable `/transcribe` through `adapter`.
    pub fn with_transcription(mut self, adapter: TranscriptionAdapter) -> Self {
        self.transcriber = Some(adapter);
        self
    }

    pub fn has_vision(&self) -> bool {
        self.vision.is_some()
    }

    pub fn has_transcription(&self) -> bool {
        self.transcriber.is_some()
    }

    // -----------------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------------

    /// Answer one chat request, choosing the image or text path.
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResult, GatewayError> {
        let result = match request.image() {
            Some(image) => self.describe_image(image, &request.message).await,
            None => self.chat(&request).await,
        };

        if let Err(e) = &result {
            log::error!("chat request failed: {e}");
        }
        result
    }

    async fn describe_image(&self, image: &str, message: &str) -> Result<ChatResult, GatewayError> {
        let engine = self
            .vision
            .as_ref()
            .ok_or(GatewayError::CapabilityDisabled("Image analysis"))?;

        let image = strip_data_uri(image)?;
        let prompt = if message.is_empty() {
            DEFAULT_IMAGE_PROMPT
        } else {
            message
        };
        let model = &self.ollama.vision_model;
        log::info!("Analyzing image with {model} ({} base64 chars)", image.len());

        let request = GenerateRequest::text(model.as_str(), prompt, self.ollama.vision_timeout())
            .with_image(image);
        let operation = || format!("Failed to analyze image with {model}");

        let response = engine
            .generate(&request)
            .await
            .map_err(|e| GatewayError::upstream(operation(), e))?;
        ensure_content(&response, operation)?;

        Ok(ChatResult {
            response,
            kind: ChatKind::ImageAnalysis,
        })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResult, GatewayError> {
        let model = request
            .requested_model()
            .unwrap_or(&self.ollama.text_model);
        log::info!(
            "Using text model: {model} ({} prior turn(s))",
            request.conversation_history.len()
        );

        let prompt = self
            .assembler
            .build_prompt(&request.conversation_history, &request.message);
        let generate = GenerateRequest::text(model, prompt, self.ollama.text_timeout());
        let operation = || format!("Failed to get chat response from model: {model}");

        let response = self
            .text
            .generate(&generate)
            .await
            .map_err(|e| GatewayError::upstream(operation(), e))?;
        ensure_content(&response, operation)?;

        Ok(ChatResult {
            response,
            kind: ChatKind::TextChat,
        })
    }

    // -----------------------------------------------------------------------
    // Transcription
    // -----------------------------------------------------------------------

    /// Transcribe one uploaded audio file.
    pub async fn transcribe<B>(
        &self,
        audio: B,
        file_name: Option<&str>,
    ) -> Result<TranscriptionResult, GatewayError>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let adapter = self
            .transcriber
            .as_ref()
            .ok_or(GatewayError::CapabilityDisabled("Transcription"))?;

        match adapter.transcribe(audio, file_name).await {
            Ok(result) => {
                log::info!(
                    "Transcribed {} segment(s), language={}",
                    result.segment_count,
                    result.language.as_deref().unwrap_or("unknown")
                );
                Ok(result)
            }
            Err(e) => {
                log::error!("transcription failed: {e}");
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Health
    // -----------------------------------------------------------------------

    /// Probe the generative engine's model listing.
    ///
    /// The vision model counts as available when some listed name contains
    /// its family (`"llava"` for `"llava:latest"`).  An empty listing
    /// reports it unavailable.
    pub async fn engine_status(&self) -> EngineStatus {
        match self.text.list_models().await {
            Ok(models) => {
                log::info!("Ollama lists models: {models:?}");
                let family = self.ollama.vision_family();
                EngineStatus {
                    ollama_running: true,
                    llava_available: models.iter().any(|name| name.contains(family)),
                }
            }
            Err(e) => {
                log::error!("Error checking Ollama connection: {e}");
                EngineStatus {
                    ollama_running: false,
                    llava_available: false,
                }
            }
        }
    }
}

/// Remove a `data:<mime>;base64,` prefix, leaving raw base64 untouched.
pub fn strip_data_uri(image: &str) -> Result<&str, GatewayError> {
    let payload = if image.starts_with("data:") {
        image
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| GatewayError::MalformedInput("image data URI has no ',' separator".into()))?
    } else {
        image
    };

    if payload.is_empty() {
        return Err(GatewayError::MalformedInput("image payload is empty".into()));
    }
    Ok(payload)
}

fn ensure_content(
    response: &str,
    operation: impl FnOnce() -> String,
) -> Result<(), GatewayError> {
    if response.trim().is_empty() {
        return Err(GatewayError::UpstreamEmptyResult {
            operation: operation(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::llm::{LlmError, StubEngine, Turn};
    use crate::stt::adapter::tests::{pcm_bytes, RawPcmDecoder};
    use crate::stt::{MockSttEngine, SttError};

    fn dispatcher(text: Arc<StubEngine>) -> Dispatcher {
        Dispatcher::new(&GatewayConfig::default(), text)
    }

    fn with_vision(text: Arc<StubEngine>, vision: Arc<StubEngine>) -> Dispatcher {
        dispatcher(text).with_vision(vision)
    }

    fn image_request(message: &str, image: &str) -> ChatRequest {
        ChatRequest {
            image_base64: Some(image.into()),
            ..ChatRequest::text(message)
        }
    }

    // --- text path ---

    #[tokio::test]
    async fn text_request_uses_default_model() {
        let text = Arc::new(StubEngine::ok("hello"));
        let result = dispatcher(text.clone())
            .handle(ChatRequest::text("hi"))
            .await
            .unwrap();

        assert_eq!(result.response, "hello");
        assert_eq!(result.kind, ChatKind::TextChat);

        let seen = text.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "mistral:7b");
        assert_eq!(seen[0].prompt, "Human: hi\nAssistant: ");
        assert!(seen[0].images.is_empty());
        assert_eq!(seen[0].timeout, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn text_request_forwards_requested_model_verbatim() {
        let text = Arc::new(StubEngine::ok("ok"));
        let request = ChatRequest {
            model: Some("llama3:8b".into()),
            ..ChatRequest::text("hi")
        };
        dispatcher(text.clone()).handle(request).await.unwrap();
        assert_eq!(text.requests()[0].model, "llama3:8b");
    }

    #[tokio::test]
    async fn empty_model_falls_back_to_default() {
        let text = Arc::new(StubEngine::ok("ok"));
        let request = ChatRequest {
            model: Some(String::new()),
            ..ChatRequest::text("hi")
        };
        dispatcher(text.clone()).handle(request).await.unwrap();
        assert_eq!(text.requests()[0].model, "mistral:7b");
    }

    #[tokio::test]
    async fn history_is_flattened_into_prompt() {
        let text = Arc::new(StubEngine::ok("ok"));
        let request = ChatRequest {
            conversation_history: vec![Turn::new("2+2?", "4")],
            ..ChatRequest::text("and 3+3?")
        };
        dispatcher(text.clone()).handle(request).await.unwrap();
        assert_eq!(
            text.requests()[0].prompt,
            "Human: 2+2?\nAssistant: 4\nHuman: and 3+3?\nAssistant: "
        );
    }

    #[tokio::test]
    async fn configured_window_limits_history() {
        let mut config = GatewayConfig::default();
        config.context.max_turns = 1;
        let text = Arc::new(StubEngine::ok("ok"));
        let request = ChatRequest {
            conversation_history: vec![Turn::new("old", "x"), Turn::new("new", "y")],
            ..ChatRequest::text("m")
        };

        Dispatcher::new(&config, text.clone())
            .handle(request)
            .await
            .unwrap();
        let prompt = &text.requests()[0].prompt;
        assert!(!prompt.contains("old"));
        assert!(prompt.starts_with("Human: new\n"));
    }

    #[tokio::test]
    async fn empty_text_response_is_a_failure() {
        let text = Arc::new(StubEngine::ok(""));
        let err = dispatcher(text).handle(ChatRequest::text("hi")).await.unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamEmptyResult { .. }));
        assert!(err.to_string().contains("mistral:7b"));
    }

    #[tokio::test]
    async fn unreachable_text_engine_names_the_model() {
        let text = Arc::new(StubEngine::err(LlmError::Request("connection refused".into())));
        let request = ChatRequest {
            model: Some("llama3:8b".into()),
            ..ChatRequest::text("hi")
        };
        let err = dispatcher(text).handle(request).await.unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamUnreachable { .. }));
        assert!(err
            .to_string()
            .starts_with("Failed to get chat response from model: llama3:8b"));
    }

    // --- image path ---

    #[tokio::test]
    async fn data_uri_and_raw_base64_send_identical_payloads() {
        let vision = Arc::new(StubEngine::ok("a cat"));
        let d = with_vision(Arc::new(StubEngine::ok("unused")), vision.clone());

        d.handle(image_request("what?", "data:image/png;base64,AAAA"))
            .await
            .unwrap();
        d.handle(image_request("what?", "AAAA")).await.unwrap();

        let seen = vision.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1]);
        assert_eq!(seen[0].images, vec!["AAAA".to_string()]);
    }

    #[tokio::test]
    async fn image_request_ignores_model_field() {
        let text = Arc::new(StubEngine::ok("unused"));
        let vision = Arc::new(StubEngine::ok("a dog"));
        let request = ChatRequest {
            model: Some("llama3:8b".into()),
            ..image_request("describe", "Zm9v")
        };

        let result = with_vision(text.clone(), vision.clone())
            .handle(request)
            .await
            .unwrap();

        assert_eq!(result.kind, ChatKind::ImageAnalysis);
        assert_eq!(result.response, "a dog");
        assert!(text.requests().is_empty());

        let seen = vision.requests();
        assert_eq!(seen[0].model, "llava:latest");
        assert_eq!(seen[0].prompt, "describe");
        assert_eq!(seen[0].timeout, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn empty_message_uses_default_image_prompt() {
        let vision = Arc::new(StubEngine::ok("a cat"));
        with_vision(Arc::new(StubEngine::ok("unused")), vision.clone())
            .handle(image_request("", "data:image/png;base64,Zm9v"))
            .await
            .unwrap();
        assert_eq!(vision.requests()[0].prompt, DEFAULT_IMAGE_PROMPT);
    }

    #[tokio::test]
    async fn empty_image_string_takes_text_path() {
        let text = Arc::new(StubEngine::ok("hello"));
        let vision = Arc::new(StubEngine::ok("unused"));
        let result = with_vision(text.clone(), vision.clone())
            .handle(image_request("hi", ""))
            .await
            .unwrap();
        assert_eq!(result.kind, ChatKind::TextChat);
        assert!(vision.requests().is_empty());
    }

    #[tokio::test]
    async fn image_without_vision_is_capability_error() {
        let err = dispatcher(Arc::new(StubEngine::ok("unused")))
            .handle(image_request("", "Zm9v"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::CapabilityDisabled(_)));
    }

    #[tokio::test]
    async fn failed_image_analysis_names_vision_model() {
        let vision = Arc::new(StubEngine::err(LlmError::Timeout));
        let err = with_vision(Arc::new(StubEngine::ok("unused")), vision)
            .handle(image_request("", "Zm9v"))
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Failed to analyze image with llava:latest"));
    }

    #[test]
    fn strip_data_uri_cases() {
        assert_eq!(strip_data_uri("data:image/png;base64,AAAA").unwrap(), "AAAA");
        assert_eq!(strip_data_uri("data:image/jpeg;base64,a,b").unwrap(), "a,b");
        assert_eq!(strip_data_uri("AAAA").unwrap(), "AAAA");
        assert!(matches!(
            strip_data_uri("data:image/png;base64"),
            Err(GatewayError::MalformedInput(_))
        ));
        assert!(matches!(
            strip_data_uri("data:image/png;base64,"),
            Err(GatewayError::MalformedInput(_))
        ));
    }

    /// Known gap: the dispatcher adds no deadline, cancellation or
    /// concurrency limit of its own.  A hung engine holds the request until
    /// the per-call timeout carried in the request elapses.
    #[tokio::test]
    async fn only_bound_on_a_slow_engine_is_the_per_call_timeout() {
        let text = Arc::new(StubEngine::ok("late"));
        let vision = Arc::new(StubEngine::ok("late"));
        let d = with_vision(text.clone(), vision.clone());

        d.handle(ChatRequest::text("hi")).await.unwrap();
        d.handle(image_request("", "Zm9v")).await.unwrap();

        assert_eq!(text.requests()[0].timeout, Duration::from_secs(60));
        assert_eq!(vision.requests()[0].timeout, Duration::from_secs(120));
    }

    // --- transcription ---

    #[tokio::test]
    async fn transcribe_without_adapter_is_capability_error() {
        let err = dispatcher(Arc::new(StubEngine::ok("unused")))
            .transcribe(pcm_bytes(16), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::CapabilityDisabled("Transcription")));
    }

    #[tokio::test]
    async fn transcribe_maps_engine_errors() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = TranscriptionAdapter::new(
            Arc::new(MockSttEngine::err(SttError::Transcription("bad model".into()))),
            Arc::new(RawPcmDecoder::default()),
            dir.path(),
        );
        let d = dispatcher(Arc::new(StubEngine::ok("unused"))).with_transcription(adapter);

        let err = d.transcribe(pcm_bytes(16), None).await.unwrap_err();
        assert!(matches!(err, GatewayError::TranscriptionFailure(_)));
        assert!(err.to_string().contains("bad model"));
    }

    // --- health ---

    #[tokio::test]
    async fn status_reports_vision_model_when_listed() {
        let text = Arc::new(StubEngine::ok("x").with_models(&["mistral:7b", "llava:13b"]));
        let status = dispatcher(text).engine_status().await;
        assert_eq!(
            status,
            EngineStatus {
                ollama_running: true,
                llava_available: true
            }
        );
    }

    #[tokio::test]
    async fn status_without_vision_model() {
        let text = Arc::new(StubEngine::ok("x").with_models(&["mistral:7b"]));
        let status = dispatcher(text).engine_status().await;
        assert!(status.ollama_running);
        assert!(!status.llava_available);
    }

    #[tokio::test]
    async fn status_with_empty_listing_reports_vision_unavailable() {
        let text = Arc::new(StubEngine::ok("x").with_models(&[]));
        let status = dispatcher(text).engine_status().await;
        assert!(status.ollama_running);
        assert!(!status.llava_available);
    }

    #[tokio::test]
    async fn status_when_engine_is_down() {
        let text = Arc::new(StubEngine::err(LlmError::Status(503)));
        let status = dispatcher(text).engine_status().await;
        assert_eq!(
            status,
            EngineStatus {
                ollama_running: false,
                llava_available: false
            }
        );
    }

    #[test]
    fn capabilities_are_reported() {
        let d = dispatcher(Arc::new(StubEngine::ok("x")));
        assert!(!d.has_vision());
        assert!(!d.has_transcription());

        let d = d.with_vision(Arc::new(StubEngine::ok("y")));
        assert!(d.has_vision());
        assert!(!d.has_transcription());

        let adapter = TranscriptionAdapter::new(
            Arc::new(MockSttEngine::segments(&["x"])),
            Arc::new(RawPcmDecoder::default()),
            std::env::temp_dir(),
        );
        let d = d.with_transcription(adapter);
        assert!(d.has_transcription());
    }
}
