//! API handlers for the speech proxy.

use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use parrot_voice::{PipelineError, SpeechOutput, SynthesisError};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Format of the returned audio: `primary` or `telephony`.
pub const AUDIO_FORMAT_HEADER: &str = "x-audio-format";
/// `hit` when the audio was served from the cache, `miss` otherwise.
pub const CACHE_HEADER: &str = "x-cache";
/// Present with value `true` when telephony audio was requested but the
/// primary format was returned because conversion failed.
pub const FALLBACK_HEADER: &str = "x-telephony-fallback";

/// Request body for `POST /api/tts`.
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    /// Text to synthesize.
    #[serde(default)]
    pub text: String,
    /// Provider voice identifier.
    #[serde(default, rename = "voiceId", alias = "voiceIdentifier")]
    pub voice_id: String,
    /// Return 16 kHz mono PCM WAV instead of the provider's format.
    #[serde(default)]
    pub telephony: bool,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("speech provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("speech provider rejected request: {0}")]
    ProviderRejected(String),
    #[error("speech provider timed out: {0}")]
    ProviderTimeout(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(e) => ApiError::BadRequest(e.to_string()),
            PipelineError::Synthesis(e @ SynthesisError::Transient { .. }) => {
                ApiError::ProviderUnavailable(e.to_string())
            }
            PipelineError::Synthesis(e @ SynthesisError::Permanent { .. }) => {
                ApiError::ProviderRejected(e.to_string())
            }
            PipelineError::Synthesis(e @ SynthesisError::Timeout(_)) => {
                ApiError::ProviderTimeout(e.to_string())
            }
            PipelineError::Internal(msg) => ApiError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ProviderUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::ProviderRejected(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::ProviderTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Handler for `POST /api/tts`.
///
/// The pipeline runs on its own task: if the caller disconnects, synthesis
/// and conversion still finish and populate the cache.
pub async fn tts_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let pipeline = state.pipeline.clone();
    let output = tokio::spawn(async move {
        pipeline
            .speak(&payload.text, &payload.voice_id, payload.telephony)
            .await
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "speech pipeline task failed");
        ApiError::from(PipelineError::Internal(
            "speech pipeline task failed".to_string(),
        ))
    })??;

    Ok(audio_response(output))
}

fn audio_response(output: SpeechOutput) -> Response {
    let mut response = (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(output.format.content_type()),
            ),
            (
                HeaderName::from_static(AUDIO_FORMAT_HEADER),
                HeaderValue::from_static(output.format.as_str()),
            ),
            (
                HeaderName::from_static(CACHE_HEADER),
                HeaderValue::from_static(output.cache.as_str()),
            ),
        ],
        output.audio,
    )
        .into_response();

    if output.telephony_fallback {
        response.headers_mut().insert(
            HeaderName::from_static(FALLBACK_HEADER),
            HeaderValue::from_static("true"),
        );
    }

    response
}
