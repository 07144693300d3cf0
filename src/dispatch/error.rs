//! Gateway-level error taxonomy.
//!
//! Engine errors ([`LlmError`], [`SttError`]) are folded into
//! [`GatewayError`] together with the operation that failed, so the
//! `Display` string is a complete human-readable `detail` for the client.

use thiserror::Error;

use crate::llm::LlmError;
use crate::stt::SttError;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The client sent a request the gateway cannot interpret.
    #[error("{0}")]
    MalformedInput(String),

    /// The engine could not be reached, timed out, or answered with an
    /// error status.
    #[error("{operation} ({reason})")]
    UpstreamUnreachable { operation: String, reason: String },

    /// The engine answered but produced no usable text.
    #[error("{operation} (engine returned no content)")]
    UpstreamEmptyResult { operation: String },

    /// Decoding or speech recognition failed.
    #[error("Failed to transcribe audio ({0})")]
    TranscriptionFailure(String),

    /// The request needs an adapter this gateway was started without.
    #[error("{0} is not available on this gateway")]
    CapabilityDisabled(&'static str),
}

impl GatewayError {
    /// Attach the failed `operation` to an engine error.
    pub fn upstream(operation: impl Into<String>, err: LlmError) -> Self {
        let operation = operation.into();
        match err {
            LlmError::EmptyResponse => GatewayError::UpstreamEmptyResult { operation },
            other => GatewayError::UpstreamUnreachable {
                operation,
                reason: other.to_string(),
            },
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, GatewayError::MalformedInput(_))
    }
}

impl From<SttError> for GatewayError {
    fn from(err: SttError) -> Self {
        GatewayError::TranscriptionFailure(err.to_string())
    }
}
