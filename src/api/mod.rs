//! HTTP surface: three routes in front of the [`Dispatcher`](crate::dispatch::Dispatcher).
//!
//! | Route              | Handler                         |
//! |--------------------|---------------------------------|
//! | `GET /`            | [`health::health`]              |
//! | `POST /chat`       | [`chat::chat`]                  |
//! | `POST /transcribe` | [`transcribe::transcribe`]      |

pub mod chat;
pub mod cors;
pub mod error;
pub mod health;
pub mod request_log;
pub mod router;
pub mod state;
pub mod transcribe;

pub use error::ApiError;
pub use router::router;
pub use state::AppState;
