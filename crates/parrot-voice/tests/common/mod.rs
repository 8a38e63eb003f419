//! In-memory collaborators that count how often the pipeline uses them.

#![allow(dead_code)]

use async_trait::async_trait;
use parrot_types::AudioFormat;
use parrot_voice::{
    AudioCache, AudioConverter, CacheError, CacheKey, ConversionError, RetryPolicy,
    SpeechPipeline, SpeechProvider, SynthesisClient, SynthesisError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MP3: &[u8] = b"ID3\x04fake-mpeg-audio";
pub const WAV: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfake-pcm";

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<(String, AudioFormat), Vec<u8>>>,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl MemoryCache {
    pub fn insert(&self, key: &CacheKey, format: AudioFormat, data: &[u8]) {
        self.entries
            .lock()
            .unwrap()
            .insert((key.as_str().to_string(), format), data.to_vec());
    }

    pub fn get(&self, key: &CacheKey, format: AudioFormat) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap()
            .get(&(key.as_str().to_string(), format))
            .cloned()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

fn injected_failure() -> CacheError {
    CacheError::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "injected failure",
    ))
}

#[async_trait]
impl AudioCache for MemoryCache {
    async fn has(&self, key: &CacheKey, format: AudioFormat) -> Result<bool, CacheError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(self.get(key, format).is_some())
    }

    async fn read(
        &self,
        key: &CacheKey,
        format: AudioFormat,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(self.get(key, format))
    }

    async fn write(
        &self,
        key: &CacheKey,
        format: AudioFormat,
        data: &[u8],
    ) -> Result<(), CacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        self.insert(key, format, data);
        Ok(())
    }
}

/// Replays scripted outcomes, then keeps returning `MP3`.
#[derive(Default)]
pub struct ScriptedProvider {
    outcomes: Mutex<VecDeque<Result<Vec<u8>, SynthesisError>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<Result<Vec<u8>, SynthesisError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechProvider for ScriptedProvider {
    async fn synthesize_once(&self, _: &str, _: &str) -> Result<Vec<u8>, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(MP3.to_vec()))
    }
}

pub struct FakeConverter {
    succeed: bool,
    calls: AtomicUsize,
}

impl FakeConverter {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioConverter for FakeConverter {
    async fn convert(&self, _primary: &[u8]) -> Result<Vec<u8>, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(WAV.to_vec())
        } else {
            Err(ConversionError::Failed("exit status: 1".to_string()))
        }
    }
}

pub fn transient(status: u16) -> SynthesisError {
    SynthesisError::Transient {
        status: Some(status),
        message: "upstream unavailable".to_string(),
    }
}

pub fn permanent(status: u16) -> SynthesisError {
    SynthesisError::Permanent {
        status: Some(status),
        message: "rejected".to_string(),
    }
}

pub struct Harness {
    pub cache: Arc<MemoryCache>,
    pub provider: Arc<ScriptedProvider>,
    pub converter: Arc<FakeConverter>,
    pub pipeline: SpeechPipeline,
}

impl Harness {
    pub fn new(provider: ScriptedProvider, converter: FakeConverter) -> Self {
        let cache = Arc::new(MemoryCache::default());
        let provider = Arc::new(provider);
        let converter = Arc::new(converter);
        let pipeline = SpeechPipeline::new(
            cache.clone(),
            SynthesisClient::new(provider.clone(), RetryPolicy::default()),
            converter.clone(),
        );
        Self {
            cache,
            provider,
            converter,
            pipeline,
        }
    }

    pub fn healthy() -> Self {
        Self::new(ScriptedProvider::default(), FakeConverter::succeeding())
    }
}

pub fn no_wait_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        initial_backoff: Duration::from_millis(10),
        jitter: false,
    }
}
