//! Parrot server library logic.

pub mod api;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use config::Config;
use parrot_voice::{
    CacheError, DiskCache, ElevenLabsProvider, FfmpegConverter, SpeechPipeline, SynthesisClient,
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Maximum request body size (64 KiB). Matches the text size limit.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Request pipeline: cache, provider and converter.
    pub pipeline: Arc<SpeechPipeline>,
}

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open cache directory: {0}")]
    Cache(#[from] CacheError),

    #[error("failed to build provider HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AppState {
    pub fn new(pipeline: SpeechPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Wires the production collaborators described by `config`.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let cache = DiskCache::open(&config.cache.dir).await?;
        let provider = ElevenLabsProvider::new(config.provider.clone())?;
        let synthesizer = SynthesisClient::new(Arc::new(provider), config.provider.retry_policy());
        let converter = FfmpegConverter::new(&config.converter);

        Ok(Self::new(SpeechPipeline::new(
            Arc::new(cache),
            synthesizer,
            Arc::new(converter),
        )))
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/tts", post(api::tts_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
