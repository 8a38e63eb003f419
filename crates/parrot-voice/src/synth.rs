//! Provider calls with retry and exponential backoff.

use crate::error::SynthesisError;
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A single call to a remote speech provider.
///
/// Implementations perform exactly one attempt and classify the outcome;
/// retrying is the job of [`SynthesisClient`].
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    async fn synthesize_once(&self, text: &str, voice_id: &str)
        -> Result<Vec<u8>, SynthesisError>;
}

/// When and how often to retry transient provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry. Doubles for each further retry.
    pub initial_backoff: Duration,
    /// Adds up to 10% random delay on top of each backoff.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let base = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(retry));
        if !self.jitter {
            return base;
        }
        let max_jitter_ms = (base.as_millis() / 10) as u64;
        if max_jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter_ms))
    }
}

/// Synthesis entry point used by the pipeline.
#[derive(Clone)]
pub struct SynthesisClient {
    provider: Arc<dyn SpeechProvider>,
    policy: RetryPolicy,
}

impl SynthesisClient {
    pub fn new(provider: Arc<dyn SpeechProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Synthesizes `text` with `voice_id`, retrying transient failures.
    ///
    /// Permanent errors and timeouts are returned after the first attempt.
    /// When retries run out, the last transient error is returned.
    pub async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, SynthesisError> {
        let mut retry = 0;
        loop {
            let attempt = retry + 1;
            match self.provider.synthesize_once(text, voice_id).await {
                Ok(audio) => {
                    if retry > 0 {
                        info!(attempt, voice_id, "provider call succeeded after retry");
                    }
                    return Ok(audio);
                }
                Err(e) if e.is_transient() && retry < self.policy.max_retries => {
                    let delay = self.policy.backoff(retry);
                    warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient provider failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(e) => {
                    warn!(attempt, kind = e.kind(), error = %e, "provider call failed");
                    return Err(e);
                }
            }
        }
    }
}
