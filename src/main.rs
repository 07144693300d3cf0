//! Gateway entry point.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse CLI flags and load [`GatewayConfig`] (defaults on first run).
//! 3. Build the Ollama client, wiring the vision path when enabled.
//! 4. Load the Whisper model; without it the gateway starts with
//!    transcription unwired.
//! 5. Probe Ollama once and log the result.
//! 6. Serve until Ctrl-C / SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use chatbot_gateway::{
    api::{self, AppState},
    config::GatewayConfig,
    dispatch::Dispatcher,
    llm::{GenerativeEngine, OllamaClient},
    stt::{TranscribeParams, TranscriptionAdapter, WhisperEngine},
};

#[derive(Parser, Debug)]
#[command(name = "chatbot-gateway", version, about = "Chat, image and transcription gateway")]
struct Cli {
    /// Path to the TOML config file (defaults to the platform config dir).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("chatbot-gateway starting up");

    // 2. Configuration
    let cli = Cli::parse();
    let loaded = match &cli.config {
        Some(path) => GatewayConfig::load_from(path),
        None => GatewayConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e:#}); using defaults");
        GatewayConfig::default()
    });
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    log::info!(
        "Ollama at {} (text model {}, vision model {})",
        config.ollama.base_url,
        config.ollama.text_model,
        config.ollama.vision_model
    );

    // 3. Generative engine
    let ollama: Arc<dyn GenerativeEngine> = Arc::new(OllamaClient::from_config(&config.ollama));
    let mut dispatcher = Dispatcher::new(&config, Arc::clone(&ollama));
    if config.ollama.vision_enabled {
        dispatcher = dispatcher.with_vision(ollama);
    } else {
        log::info!("Image analysis disabled by config");
    }

    // 4. Speech-to-text (degrade gracefully without a model file)
    if config.stt.enabled {
        let params = TranscribeParams::from_config(&config.stt);
        match WhisperEngine::load(&config.stt.model_path, params) {
            Ok(engine) => {
                log::info!("Whisper model loaded: {}", config.stt.model_path.display());
                let adapter = TranscriptionAdapter::from_config(Arc::new(engine), &config.stt);
                dispatcher = dispatcher.with_transcription(adapter);
            }
            Err(e) => log::warn!(
                "Could not load Whisper model ({}): {e}. /transcribe will be unavailable.",
                config.stt.model_path.display()
            ),
        }
    } else {
        log::info!("Transcription disabled by config");
    }

    log::info!(
        "Capabilities: text chat, image analysis={}, transcription={}",
        dispatcher.has_vision(),
        dispatcher.has_transcription()
    );

    // 5. Startup probe
    let status = dispatcher.engine_status().await;
    if status.ollama_running {
        log::info!(
            "Ollama is running; {} available: {}",
            config.ollama.vision_model,
            status.llava_available
        );
    } else {
        log::warn!("Ollama is not reachable at {}", config.ollama.base_url);
    }

    // 6. Serve
    let bind = config.server.bind_address.clone();
    let app = api::router(AppState::new(dispatcher, config.server));
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    log::info!("chatbot-gateway stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    log::info!("Shutdown signal received; finishing in-flight requests");
}
