//! Request dispatch: one entry point that decides between text chat, image
//! description and transcription, and folds engine failures into
//! [`GatewayError`].

pub mod dispatcher;
pub mod error;
pub mod types;

pub use dispatcher::{strip_data_uri, Dispatcher, DEFAULT_IMAGE_PROMPT};
pub use error::GatewayError;
pub use types::{ChatKind, ChatRequest, ChatResult, EngineStatus};
