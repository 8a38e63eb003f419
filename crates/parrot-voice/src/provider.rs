//! ElevenLabs text-to-speech over HTTP.

use crate::config::ProviderConfig;
use crate::error::SynthesisError;
use crate::synth::SpeechProvider;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use tracing::debug;

/// Longest provider error body echoed into an error message.
const MAX_ERROR_BODY_CHARS: usize = 256;

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Serialize)]
struct TtsBody<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<&'a str>,
    voice_settings: VoiceSettings,
}

/// Calls `POST {base_url}/v1/text-to-speech/{voice_id}` once per attempt.
#[derive(Debug, Clone)]
pub struct ElevenLabsProvider {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ElevenLabsProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, voice_id: &str) -> Result<Url, SynthesisError> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| SynthesisError::Permanent {
            status: None,
            message: format!("invalid provider base URL: {}", e),
        })?;
        // Pushed as a segment so the voice id is percent-encoded and cannot
        // escape the path.
        url.path_segments_mut()
            .map_err(|_| SynthesisError::Permanent {
                status: None,
                message: "provider base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(["v1", "text-to-speech", voice_id]);
        Ok(url)
    }

    fn classify_transport(&self, err: reqwest::Error) -> SynthesisError {
        if err.is_timeout() {
            SynthesisError::Timeout(self.config.timeout_secs)
        } else if err.is_connect() || err.is_request() || err.is_body() {
            SynthesisError::Transient {
                status: None,
                message: err.to_string(),
            }
        } else {
            // No response and no clear network cause: do not retry blindly.
            SynthesisError::Permanent {
                status: None,
                message: err.to_string(),
            }
        }
    }
}

fn classify_status(status: StatusCode, body: &str) -> SynthesisError {
    let mut message: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
    if message.is_empty() {
        message = status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string();
    }

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        SynthesisError::Transient {
            status: Some(status.as_u16()),
            message,
        }
    } else {
        SynthesisError::Permanent {
            status: Some(status.as_u16()),
            message,
        }
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    async fn synthesize_once(
        &self,
        text: &str,
        voice_id: &str,
    ) -> Result<Vec<u8>, SynthesisError> {
        if !self.config.has_api_key() {
            return Err(SynthesisError::Permanent {
                status: None,
                message: "provider API key is not configured".to_string(),
            });
        }

        let url = self.endpoint(voice_id)?;
        let body = TtsBody {
            text,
            model_id: self.config.model_id.as_deref(),
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        debug!(voice_id, chars = text.chars().count(), "calling speech provider");

        let response = self
            .http
            .post(url)
            .header("xi-api-key", &self.config.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| self.classify_transport(e))?;

        if audio.is_empty() {
            return Err(SynthesisError::Permanent {
                status: Some(status.as_u16()),
                message: "provider returned empty audio".to_string(),
            });
        }

        Ok(audio.to_vec())
    }
}
