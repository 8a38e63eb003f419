//! End-to-end handling of one synthesis request.
//!
//! ```text
//! key ─┬─ telephony wanted and cached ──────────────────────────► telephony (hit)
//!      └─ primary cached? ── no ─► synthesize ─► store primary ─┐
//!                           yes ────────────────────────────────┤
//!                                     telephony not wanted ◄────┤
//!                                     convert ─ ok ─► store ─► telephony
//!                                             └ err ─────────► primary (fallback)
//! ```

use crate::cache::AudioCache;
use crate::convert::AudioConverter;
use crate::error::PipelineError;
use crate::key::{cache_key, CacheKey};
use crate::synth::SynthesisClient;
use parrot_types::{AudioFormat, SynthesisRequest};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whether the returned audio came from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

/// Audio returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechOutput {
    pub audio: Vec<u8>,
    pub format: AudioFormat,
    pub cache: CacheStatus,
    /// Telephony was requested but conversion failed, so `audio` is primary.
    pub telephony_fallback: bool,
}

/// Orchestrates cache lookups, synthesis and conversion.
#[derive(Clone)]
pub struct SpeechPipeline {
    cache: Arc<dyn AudioCache>,
    synthesizer: SynthesisClient,
    converter: Arc<dyn AudioConverter>,
}

impl SpeechPipeline {
    pub fn new(
        cache: Arc<dyn AudioCache>,
        synthesizer: SynthesisClient,
        converter: Arc<dyn AudioConverter>,
    ) -> Self {
        Self {
            cache,
            synthesizer,
            converter,
        }
    }

    /// Validates raw request fields and answers the request.
    ///
    /// A malformed request fails with [`PipelineError::Validation`] before
    /// any cache, provider or converter call.
    pub async fn speak(
        &self,
        text: &str,
        voice_id: &str,
        wants_telephony: bool,
    ) -> Result<SpeechOutput, PipelineError> {
        let request = SynthesisRequest::new(text, voice_id, wants_telephony)?;
        self.handle(&request).await
    }

    /// Answers one validated request.
    ///
    /// Only provider failures are returned as errors. Cache failures and
    /// conversion failures are logged and worked around.
    pub async fn handle(&self, request: &SynthesisRequest) -> Result<SpeechOutput, PipelineError> {
        let key = cache_key(request.voice_id(), request.text());

        if request.wants_telephony() {
            if let Some(audio) = self.lookup(&key, AudioFormat::Telephony).await {
                debug!(key = %key, "telephony cache hit");
                return Ok(SpeechOutput {
                    audio,
                    format: AudioFormat::Telephony,
                    cache: CacheStatus::Hit,
                    telephony_fallback: false,
                });
            }
        }

        let (primary, primary_status) = match self.lookup(&key, AudioFormat::Primary).await {
            Some(audio) => {
                debug!(key = %key, "primary cache hit");
                (audio, CacheStatus::Hit)
            }
            None => {
                let audio = self
                    .synthesizer
                    .synthesize(request.text(), request.voice_id())
                    .await?;
                info!(
                    key = %key,
                    voice_id = request.voice_id(),
                    bytes = audio.len(),
                    "synthesized audio"
                );
                self.store(&key, AudioFormat::Primary, &audio).await;
                (audio, CacheStatus::Miss)
            }
        };

        if !request.wants_telephony() {
            return Ok(SpeechOutput {
                audio: primary,
                format: AudioFormat::Primary,
                cache: primary_status,
                telephony_fallback: false,
            });
        }

        match self.converter.convert(&primary).await {
            Ok(telephony) => {
                self.store(&key, AudioFormat::Telephony, &telephony).await;
                Ok(SpeechOutput {
                    audio: telephony,
                    format: AudioFormat::Telephony,
                    cache: CacheStatus::Miss,
                    telephony_fallback: false,
                })
            }
            Err(e) => {
                warn!(key = %key, error = %e, "telephony conversion failed, returning primary audio");
                Ok(SpeechOutput {
                    audio: primary,
                    format: AudioFormat::Primary,
                    cache: primary_status,
                    telephony_fallback: true,
                })
            }
        }
    }

    /// Cache read where an unreadable or empty entry counts as a miss.
    async fn lookup(&self, key: &CacheKey, format: AudioFormat) -> Option<Vec<u8>> {
        match self.cache.read(key, format).await {
            Ok(Some(audio)) if audio.is_empty() => {
                warn!(key = %key, %format, "empty cache entry, treating as miss");
                None
            }
            Ok(found) => found,
            Err(e) => {
                warn!(key = %key, %format, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Best-effort cache write. The caller already holds the bytes.
    async fn store(&self, key: &CacheKey, format: AudioFormat, audio: &[u8]) {
        if let Err(e) = self.cache.write(key, format, audio).await {
            warn!(key = %key, %format, error = %e, "failed to persist audio to cache");
        }
    }
}
