#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use parrot_server::AppState;
use parrot_voice::{
    AudioConverter, ConversionError, DiskCache, RetryPolicy, SpeechPipeline, SpeechProvider,
    SynthesisClient, SynthesisError,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const MP3: &[u8] = b"ID3\x04server-test-mpeg";
pub const WAV: &[u8] = b"RIFF\x24\x00\x00\x00WAVEserver-test";

/// Returns the same outcome on every call and counts calls.
pub struct FixedProvider {
    outcome: Result<Vec<u8>, SynthesisError>,
    calls: AtomicUsize,
}

impl FixedProvider {
    pub fn ok() -> Self {
        Self::with(Ok(MP3.to_vec()))
    }

    pub fn failing(err: SynthesisError) -> Self {
        Self::with(Err(err))
    }

    fn with(outcome: Result<Vec<u8>, SynthesisError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechProvider for FixedProvider {
    async fn synthesize_once(&self, _: &str, _: &str) -> Result<Vec<u8>, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

pub struct PanickingProvider;

#[async_trait]
impl SpeechProvider for PanickingProvider {
    async fn synthesize_once(&self, _: &str, _: &str) -> Result<Vec<u8>, SynthesisError> {
        panic!("provider bug");
    }
}

pub struct FakeConverter {
    pub succeed: bool,
    calls: AtomicUsize,
}

impl FakeConverter {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioConverter for FakeConverter {
    async fn convert(&self, _: &[u8]) -> Result<Vec<u8>, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(WAV.to_vec())
        } else {
            Err(ConversionError::Failed("exit status: 1".to_string()))
        }
    }
}

pub fn fast_retries() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        initial_backoff: Duration::from_millis(1),
        jitter: false,
    }
}

pub async fn state(
    cache_dir: &Path,
    provider: Arc<dyn SpeechProvider>,
    converter: Arc<dyn AudioConverter>,
) -> AppState {
    let cache = DiskCache::open(cache_dir).await.unwrap();
    AppState::new(SpeechPipeline::new(
        Arc::new(cache),
        SynthesisClient::new(provider, fast_retries()),
        converter,
    ))
}

pub fn tts_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/tts")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
