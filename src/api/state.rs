//! Shared handler state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub server: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, server: ServerConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            server: Arc::new(server),
        }
    }
}
