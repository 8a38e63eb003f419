use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::synth::RetryPolicy;

pub const DEFAULT_PROVIDER_URL: &str = "https://api.elevenlabs.io";

fn default_base_url() -> String {
    DEFAULT_PROVIDER_URL.to_string()
}

fn default_stability() -> f32 {
    0.6
}

fn default_similarity_boost() -> f32 {
    0.9
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

/// Settings for the remote speech provider.
#[derive(Clone, Deserialize)]
pub struct ProviderConfig {
    /// API credential. Empty means unset: every synthesis call fails.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model to request. The provider's default is used when unset.
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default = "default_stability")]
    pub stability: f32,
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,
    /// Per-attempt request timeout.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first attempt, for transient failures only.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff before the first retry; doubles on each subsequent one.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model_id: None,
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            timeout_secs: default_provider_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("stability", &self.stability)
            .field("similarity_boost", &self.similarity_boost)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff_ms", &self.initial_backoff_ms)
            .finish()
    }
}

impl ProviderConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            jitter: true,
        }
    }
}

fn default_ffmpeg_binary() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_converter_timeout_secs() -> u64 {
    60
}

/// Settings for the telephony transcoder.
#[derive(Debug, Clone, Deserialize)]
pub struct ConverterConfig {
    /// Transcoder executable, resolved through `PATH` when relative.
    #[serde(default = "default_ffmpeg_binary")]
    pub binary: PathBuf,
    #[serde(default = "default_converter_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            binary: default_ffmpeg_binary(),
            timeout_secs: default_converter_timeout_secs(),
        }
    }
}
