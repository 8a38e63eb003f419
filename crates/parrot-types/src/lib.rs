//! Shared request and audio types for the Parrot speech proxy.
//!
//! This crate holds the types that cross crate boundaries: the validated
//! [`SynthesisRequest`] accepted by the pipeline, the [`AudioFormat`] of a
//! cached or returned artifact, and the [`ValidationError`] produced when a
//! request is rejected before any I/O.

pub mod audio;

pub use audio::AudioFormat;

use thiserror::Error;

/// Maximum text input size (64 KiB). Longer requests are rejected before
/// they reach the provider.
pub const MAX_TEXT_BYTES: usize = 64 * 1024;

/// Reasons a synthesis request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("text must not be empty")]
    EmptyText,

    #[error("voice identifier must not be empty")]
    EmptyVoice,

    #[error("text exceeds maximum size: {len} bytes (limit: {limit} bytes)")]
    TextTooLong { len: usize, limit: usize },
}

/// A validated text-to-speech request.
///
/// Only constructible through [`SynthesisRequest::new`], so holding one means
/// the text and voice identifier are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    text: String,
    voice_id: String,
    wants_telephony: bool,
}

impl SynthesisRequest {
    /// Validates and builds a request.
    ///
    /// Whitespace-only text or voice identifiers count as empty. The text is
    /// kept verbatim; it is the cache key input.
    pub fn new(
        text: impl Into<String>,
        voice_id: impl Into<String>,
        wants_telephony: bool,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        let voice_id = voice_id.into();

        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if voice_id.trim().is_empty() {
            return Err(ValidationError::EmptyVoice);
        }
        if text.len() > MAX_TEXT_BYTES {
            return Err(ValidationError::TextTooLong {
                len: text.len(),
                limit: MAX_TEXT_BYTES,
            });
        }

        Ok(Self {
            text,
            voice_id,
            wants_telephony,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    pub fn wants_telephony(&self) -> bool {
        self.wants_telephony
    }

    /// The format the caller asked for.
    pub fn requested_format(&self) -> AudioFormat {
        if self.wants_telephony {
            AudioFormat::Telephony
        } else {
            AudioFormat::Primary
        }
    }
}
